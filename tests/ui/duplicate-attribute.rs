use dynawrap::Record;

#[derive(Debug, Record)]
#[dynawrap(pk = "USER#{username}", sk = "PROFILE")]
struct Profile {
    username: String,
    name: String,
    #[dynawrap(rename = "name")]
    display_name: String,
}

fn main() {}

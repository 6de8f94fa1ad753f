use dynawrap::Record;

#[derive(Debug, Record)]
#[dynawrap(pk = "USER#{username}", sk = "PROFILE")]
struct Profile {
    username: String,
    #[dynawrap(rename = "SK")]
    sort: String,
}

fn main() {}

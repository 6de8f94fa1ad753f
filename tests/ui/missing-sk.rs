use dynawrap::Record;

#[derive(Debug, Record)]
#[dynawrap(pk = "USER#{username}")]
struct Profile {
    username: String,
}

fn main() {}

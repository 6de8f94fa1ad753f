use dynawrap::Record;

#[derive(Debug, Record)]
#[dynawrap(pk = "USER#{username}", sk = "CACHE#{cached}")]
struct Profile {
    username: String,
    #[dynawrap(skip)]
    cached: Option<String>,
}

fn main() {}

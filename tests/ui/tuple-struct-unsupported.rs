use dynawrap::Record;

#[derive(Debug, Record)]
#[dynawrap(pk = "USER#{0}", sk = "PROFILE")]
struct Username(String);

fn main() {}

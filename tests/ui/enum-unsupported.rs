use dynawrap::Record;

#[derive(Debug, Record)]
#[dynawrap(pk = "STATUS", sk = "STATUS")]
enum Status {
    Draft,
    Published,
}

fn main() {}

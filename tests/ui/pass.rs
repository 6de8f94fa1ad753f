use dynawrap::Record;

#[derive(Debug, Record)]
#[dynawrap(pk = "USER#{owner}#STORY#{story_id}", sk = "STORY#{story_id}")]
struct Story {
    owner: String,
    story_id: String,
    title: String,
}

fn main() {}

/// Shared names used across handlers and stores

pub const POSTINGS: &str = "postings";
pub const CANDIDATES: &str = "candidates";
pub const NOTES: &str = "notes";

/// Server-assigned creation timestamp field, also the listing sort key
pub const CREATED_AT: &str = "createdAt";

pub const DEFAULT_CANDIDATE_STATUS: &str = "Inbox";

/// Sub-collection path holding one candidate's notes
pub fn notes_collection(candidate_id: &str) -> String {
    format!("{}/{}/{}", CANDIDATES, candidate_id, NOTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_notes_path() {
        assert_eq!(notes_collection("c1"), "candidates/c1/notes");
    }
}

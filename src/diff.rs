/// Parsed `@@ -old_start[,old_len] +new_start[,new_len] @@` hunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_len: u32,
    pub new_start: u32,
    pub new_len: u32,
}

/// Parse a unified diff hunk header, returning None if the line is not a valid header.
/// Omitted lengths default to 1, as in unified diff output.
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, _section) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;
    let (old_start, old_len) = parse_range(old)?;
    let (new_start, new_len) = parse_range(new)?;
    Some(HunkHeader {
        old_start,
        old_len,
        new_start,
        new_len,
    })
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once(',') {
        Some((start, len)) => Some((parse_number(start)?, parse_number(len)?)),
        None => Some((parse_number(range)?, 1)),
    }
}

fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Line number in the new file of the first added line in a patch.
///
/// Only the first addition across all hunks is reported. Lines outside a
/// valid hunk (file headers, text after a malformed `@@` line) are ignored.
pub fn first_added_line(patch: Option<&str>) -> Option<u32> {
    let patch = patch?;
    // None while outside a hunk
    let mut current: Option<u32> = None;

    for line in patch.lines() {
        if line.starts_with("@@") {
            current = parse_hunk_header(line).map(|h| h.new_start);
            continue;
        }
        let Some(line_no) = current.as_mut() else {
            continue;
        };
        match line.as_bytes().first() {
            Some(b'+') => return Some(*line_no),
            // Removed lines and "\ No newline at end of file" have no new-file line
            Some(b'-') | Some(b'\\') => {}
            _ => *line_no += 1,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_then_addition() {
        let patch = "@@ -1,3 +1,4 @@\n line1\n+line2\n line3\n";
        assert_eq!(first_added_line(Some(patch)), Some(2));
    }

    #[test]
    fn test_removal_does_not_advance() {
        let patch = "@@ -5,2 +10,2 @@\n-old\n+new\n";
        assert_eq!(first_added_line(Some(patch)), Some(10));
    }

    #[test]
    fn test_no_addition() {
        let patch = "@@ -1,3 +1,2 @@\n line1\n-line2\n line3\n";
        assert_eq!(first_added_line(Some(patch)), None);
    }

    #[test]
    fn test_empty_and_missing_patch() {
        assert_eq!(first_added_line(None), None);
        assert_eq!(first_added_line(Some("")), None);
    }

    #[test]
    fn test_first_addition_across_hunks() {
        let patch = "@@ -1,2 +1,2 @@\n a\n-b\n@@ -20,3 +20,4 @@\n x\n y\n+z\n@@ -40 +41,2 @@\n+late\n";
        assert_eq!(first_added_line(Some(patch)), Some(22));
    }

    #[test]
    fn test_malformed_header_leaves_hunk() {
        let patch = "@@ -1,2 +1,2 @@\n a\n@@ garbage @@\n+ignored\n@@ -7 +9 @@\n ctx\n+added\n";
        assert_eq!(first_added_line(Some(patch)), Some(10));
    }

    #[test]
    fn test_lines_before_first_header_are_ignored() {
        let patch = "--- a/src/a.ts\n+++ b/src/a.ts\n@@ -3,1 +3,2 @@\n keep\n+new\n";
        assert_eq!(first_added_line(Some(patch)), Some(4));
    }

    #[test]
    fn test_no_newline_marker_does_not_advance() {
        let patch = "@@ -1,1 +1,2 @@\n a\n\\ No newline at end of file\n+b\n";
        assert_eq!(first_added_line(Some(patch)), Some(2));
    }

    #[test]
    fn test_parse_hunk_header_with_section() {
        let header = parse_hunk_header("@@ -12,7 +14 @@ fn main() {").unwrap();
        assert_eq!(
            header,
            HunkHeader {
                old_start: 12,
                old_len: 7,
                new_start: 14,
                new_len: 1,
            }
        );
        assert_eq!(parse_hunk_header("@@ -a,1 +1 @@"), None);
        assert_eq!(parse_hunk_header("@@ -1 +2"), None);
    }
}

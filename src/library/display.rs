/// Build the list label for a track: `author - title`, or just the title
/// when no author is known.
pub fn display_name(title: &str, author: Option<&str>) -> String {
    match author.map(str::trim).filter(|a| !a.is_empty()) {
        Some(a) => format!("{} - {}", a, title.trim()),
        None => title.trim().to_string(),
    }
}

//! Department abbreviations used as file names by the scraping scripts.

/// Known file-stem abbreviations and their full department names
const MAJOR_NAMES: &[(&str, &str)] = &[
    ("aa", "Aeronautics and Astronautics"),
    ("aeronautics and astronautics", "Aeronautics and Astronautics"),
    ("ap", "Applied Physics"),
    ("be", "Biomedical Engineering"),
    ("bioe", "Bioengineering"),
    ("bioengineering", "Bioengineering"),
    ("biology_and_biological_engineering", "Biology and Biological Engineering"),
    ("cee", "Civil and Environmental Engineering"),
    ("cheme", "Chemical Engineering"),
    ("chemistry_and_chemical_engineering", "Chemistry and Chemical Engineering"),
    ("cs", "Computer Science"),
    ("ece", "Electrical and Computer Engineering"),
    ("ee", "Electrical Engineering"),
    ("eecs", "Electrical Engineering and Computer Sciences"),
    ("engineering_and_applied_science", "Engineering and Applied Science"),
    ("icme", "Institute for Computational and Mathematical Engineering"),
    ("me", "Mechanical Engineering"),
    ("ms", "Materials Science"),
    ("msande", "Management Science and Engineering"),
    ("mse", "Materials Science and Engineering"),
];

/// Expand a department file stem to a display name.
///
/// Known abbreviations map to their full names; anything else is title-cased
/// with underscores turned into spaces.
#[must_use]
pub fn expand_major(stem: &str) -> String {
    let key = stem.trim().to_lowercase();
    if let Some((_, full)) = MAJOR_NAMES.iter().find(|(short, _)| *short == key) {
        return (*full).to_string();
    }
    title_case(&key.replace('_', " "))
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

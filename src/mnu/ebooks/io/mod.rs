use std::collections::HashSet;

pub mod csv_read;
pub mod csv_write;
pub mod excel_read;
pub mod excel_write;

/// Makes header names addressable and acceptable as Excel table columns.
///
/// Blank headers become `Unnamed: N`. A header that repeats an earlier one,
/// ignoring case, gets the first free `.N` suffix.
pub(crate) fn unique_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(index, header)| {
            let header = header.trim();
            let base = if header.is_empty() {
                format!("Unnamed: {index}")
            } else {
                header.to_string()
            };
            let mut candidate = base.clone();
            let mut counter = 1;
            while !seen.insert(candidate.to_lowercase()) {
                candidate = format!("{base}.{counter}");
                counter += 1;
            }
            candidate
        })
        .collect()
}

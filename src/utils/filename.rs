use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Generate the cleaned-export filename: cleaned_{stem}_{YYYYMMDD-HHMMSS}.csv
pub fn generate_cleaned_filename(source: &Path, cleaned_dir: &Path) -> PathBuf {
    generate_cleaned_filename_at(source, cleaned_dir, Local::now())
}

pub fn generate_cleaned_filename_at(
    source: &Path,
    cleaned_dir: &Path,
    at: DateTime<Local>,
) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());

    let filename = format!("cleaned_{}_{}.csv", stem, at.format("%Y%m%d-%H%M%S"));
    cleaned_dir.join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_cleaned_filename() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = generate_cleaned_filename_at(
            Path::new("data/raw/asv_2021-10-21.csv"),
            Path::new("data/cleaned"),
            at,
        );

        assert_eq!(
            path,
            PathBuf::from("data/cleaned/cleaned_asv_2021-10-21_20240309-070501.csv")
        );
    }

    #[test]
    fn test_generate_cleaned_filename_uses_cleaned_dir() {
        let path = generate_cleaned_filename(Path::new("mission.csv"), Path::new("out"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(path.starts_with("out"));
        assert!(name.starts_with("cleaned_mission_"));
        assert!(name.ends_with(".csv"));
    }
}

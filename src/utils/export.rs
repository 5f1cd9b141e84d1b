//! Export file helpers.

use chrono::Utc;

use slate_core::AppError;

/// Builds a timestamped export filename, e.g. `students_20260115093045.csv`.
pub fn timestamped_filename(resource: &str) -> String {
    format!("{resource}_{}.csv", Utc::now().format("%Y%m%d%H%M%S"))
}

/// Writes an export file under `dir`, creating the directory if needed.
pub async fn write_export(dir: &str, filename: &str, bytes: Vec<u8>) -> Result<(), AppError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create export dir: {}", e)))?;

    let path = std::path::Path::new(dir).join(filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to write export file: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_shape() {
        let name = timestamped_filename("students");
        assert!(name.starts_with("students_"));
        assert!(name.ends_with(".csv"));
        // students_ + 14 digit timestamp + .csv
        assert_eq!(name.len(), "students_".len() + 14 + ".csv".len());
    }

    #[tokio::test]
    async fn test_write_export_creates_dir_and_file() {
        let dir = std::env::temp_dir().join("slate-export-test");
        let dir = dir.to_string_lossy().to_string();
        let filename = timestamped_filename("unit");

        write_export(&dir, &filename, b"a,b\n1,2\n".to_vec())
            .await
            .unwrap();

        let path = std::path::Path::new(&dir).join(&filename);
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("a,b"));

        tokio::fs::remove_file(&path).await.ok();
    }
}

use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("wordsweep"),
            )
        } else {
            ProjectDirs::from("", "", "wordsweep")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("telemetry.db"))
    }

    pub fn sessions_csv_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("sessions.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_state_dir() {
        let db = AppDirs::db_path().unwrap();
        let csv = AppDirs::sessions_csv_path().unwrap();
        assert_eq!(db.parent(), csv.parent());
        assert_eq!(db.file_name().unwrap(), "telemetry.db");
        assert_eq!(csv.file_name().unwrap(), "sessions.csv");
    }
}

use crate::paths::normalize_path;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(name = "smarttext")]
#[command(version = "0.1.0")]
#[command(about = "A single-instance multi-document text editor")]
pub struct CliArgs {
    /// Files to open (forwarded to the running editor if there is one)
    pub files: Vec<PathBuf>,

    /// Directory for the session and settings files
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of the default locations
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run independently of any already running editor
    #[arg(long)]
    pub new_instance: bool,
}

impl CliArgs {
    /// File arguments as absolute, normalized paths.
    pub fn resolved_files(&self) -> Vec<PathBuf> {
        self.files.iter().map(|p| normalize_path(p)).collect()
    }
}

pub fn parse_args() -> Result<CliArgs, Box<dyn std::error::Error>> {
    Ok(CliArgs::parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_cli_args() {
        let args = CliArgs::default();
        assert!(args.files.is_empty());
        assert!(args.resolved_files().is_empty());
        assert!(!args.new_instance);
    }

    #[test]
    fn test_parse_no_args() {
        let args = CliArgs::parse_from(["smarttext"]);
        assert!(args.files.is_empty());
        assert!(args.data_dir.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_files_and_flags() {
        let args = CliArgs::parse_from([
            "smarttext",
            "--new-instance",
            "--data-dir",
            "/tmp/st",
            "a.txt",
            "b.txt",
        ]);
        assert!(args.new_instance);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/st")));
        assert_eq!(args.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn test_resolved_files_are_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");
        fs::write(&file_path, "test content").unwrap();

        let args = CliArgs {
            files: vec![file_path.clone(), PathBuf::from("relative.txt")],
            ..Default::default()
        };

        let resolved = args.resolved_files();
        assert_eq!(resolved[0], fs::canonicalize(&file_path).unwrap());
        assert!(resolved[1].is_absolute());
    }
}

//! Script-based generator implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use super::error::GeneratorError;
use super::traits::ReportGenerator;
use crate::artifact::{DataLayout, DatasetFamily, WorkItem};
use crate::config::GeneratorConfig;

/// Runs the per-family report script once per work item.
///
/// MODIS datasets use `modis_script`, everything else `generic_script`.
/// The call waits for the script to exit; no timeout is applied.
pub struct ScriptReportGenerator {
    config: GeneratorConfig,
    layout: DataLayout,
}

impl ScriptReportGenerator {
    pub fn new(config: GeneratorConfig, layout: DataLayout) -> Self {
        Self { config, layout }
    }

    /// Script selected for a dataset family.
    pub fn script_for(&self, family: DatasetFamily) -> &Path {
        match family {
            DatasetFamily::Modis => &self.config.modis_script,
            DatasetFamily::Generic => &self.config.generic_script,
        }
    }

    /// Directory the script runs in.
    fn working_dir(&self) -> PathBuf {
        if let Some(dir) = &self.config.working_dir {
            return dir.clone();
        }
        self.config
            .modis_script
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Builds the script arguments for an item.
    fn build_args(&self, item: &WorkItem) -> Vec<String> {
        vec![
            item.unique_id.clone(),
            item.dataset.tag().to_string(),
            item.processing_type.tag().to_string(),
            self.config.today_marker.clone(),
        ]
    }
}

#[async_trait]
impl ReportGenerator for ScriptReportGenerator {
    fn name(&self) -> &str {
        "script"
    }

    async fn invoke(&self, item: &WorkItem) -> Result<PathBuf, GeneratorError> {
        let start = Instant::now();
        let reports_dir = self.layout.reports_dir();
        tokio::fs::create_dir_all(&reports_dir)
            .await
            .map_err(|e| GeneratorError::ReportDirectoryFailed {
                path: reports_dir.clone(),
                source: e,
            })?;

        let script = self.script_for(item.dataset.family());
        let args = self.build_args(item);
        let command_line = format!("{} {}", script.display(), args.join(" "));
        let script_name = script
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| script.display().to_string());

        debug!("Running report generator: {}", command_line);

        let output = Command::new(script)
            .args(&args)
            .current_dir(self.working_dir())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GeneratorError::ScriptNotFound {
                        path: script.to_path_buf(),
                    }
                } else {
                    GeneratorError::Io {
                        command: command_line.clone(),
                        source: e,
                    }
                }
            })?;

        if !output.status.success() {
            return Err(GeneratorError::failed(
                command_line,
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
                &script_name,
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{} output: {}", script_name, stdout.trim());
        }
        debug!(
            "Generated report for {} in {} ms",
            item,
            start.elapsed().as_millis()
        );

        Ok(self.layout.report_path(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{Dataset, ProcessingType};
    use crate::config::ArtifactsConfig;
    use tempfile::TempDir;

    fn generator(config: GeneratorConfig, root: &Path) -> ScriptReportGenerator {
        ScriptReportGenerator::new(config, DataLayout::new(root, &ArtifactsConfig::default()))
    }

    fn config(modis: &str, generic: &str) -> GeneratorConfig {
        GeneratorConfig {
            modis_script: PathBuf::from(modis),
            generic_script: PathBuf::from(generic),
            working_dir: None,
            today_marker: "today".to_string(),
        }
    }

    #[test]
    fn test_script_selection_by_family() {
        let generator = generator(
            config("/opt/print_modis_daily_report.csh", "/opt/print_generic_daily_report.csh"),
            Path::new("/mnt/data"),
        );
        assert_eq!(
            generator.script_for(Dataset::ModisT.family()),
            Path::new("/opt/print_modis_daily_report.csh")
        );
        assert_eq!(
            generator.script_for(Dataset::Viirs.family()),
            Path::new("/opt/print_generic_daily_report.csh")
        );
    }

    #[test]
    fn test_build_args() {
        let generator = generator(config("/opt/m.csh", "/opt/g.csh"), Path::new("/mnt/data"));
        let item = WorkItem::new(Dataset::ModisA, ProcessingType::Quicklook, "1234");
        assert_eq!(
            generator.build_args(&item),
            vec!["1234", "MODIS_A", "QUICKLOOK", "today"]
        );
    }

    #[test]
    fn test_working_dir_defaults_to_script_dir() {
        let generator = generator(config("/opt/bin/m.csh", "/opt/bin/g.csh"), Path::new("/mnt/data"));
        assert_eq!(generator.working_dir(), PathBuf::from("/opt/bin"));

        let generator = self::generator(config("m.csh", "g.csh"), Path::new("/mnt/data"));
        assert_eq!(generator.working_dir(), PathBuf::from("."));
    }

    #[tokio::test]
    async fn test_missing_script() {
        let temp = TempDir::new().unwrap();
        let mut cfg = config("/nonexistent/m.csh", "/nonexistent/g.csh");
        cfg.working_dir = Some(temp.path().to_path_buf());
        let generator = generator(cfg, temp.path());

        let item = WorkItem::new(Dataset::Viirs, ProcessingType::Refined, "1");
        let result = generator.invoke(&item).await;
        assert!(matches!(result, Err(GeneratorError::ScriptNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let temp = TempDir::new().unwrap();
        let mut cfg = config("false", "false");
        cfg.working_dir = Some(temp.path().to_path_buf());
        let generator = generator(cfg, temp.path());
        let item = WorkItem::new(Dataset::Viirs, ProcessingType::Quicklook, "55");

        match generator.invoke(&item).await {
            Err(GeneratorError::Failed {
                status,
                message,
                command,
            }) => {
                assert_eq!(status, Some(1));
                assert_eq!(message, "Error encountered in false");
                assert_eq!(command, "false 55 VIIRS QUICKLOOK today");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_returns_report_path() {
        let temp = TempDir::new().unwrap();
        let mut cfg = config("true", "true");
        cfg.working_dir = Some(temp.path().to_path_buf());
        let generator = generator(cfg, temp.path());
        let item = WorkItem::new(Dataset::ModisA, ProcessingType::Refined, "9");

        let path = generator.invoke(&item).await.unwrap();
        assert_eq!(
            path,
            temp.path()
                .join("scratch/reports/daily_report_MODIS_A_REFINED_9.txt")
        );
        assert!(temp.path().join("scratch/reports").is_dir());
    }
}

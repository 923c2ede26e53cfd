//! Sincronização remota do artefato exportado.
//!
//! O core só conhece [`RemoteSync::push`]; a sintaxe da ferramenta externa
//! (git por padrão) vive na configuração como templates de comando.

use crate::config::SyncConfig;
use crate::error::SyncError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Saída de um comando executado com sucesso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub command: String,
    pub output: String,
}

/// Resultado de um push bem-sucedido.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub artifact: PathBuf,
    pub commands: Vec<CommandOutput>,
}

/// Mecanismo externo que publica um artefato.
pub trait RemoteSync: Send {
    fn push(&self, artifact: &Path) -> Result<SyncReport, SyncError>;
}

/// Executa uma sequência de comandos num repositório local existente.
///
/// `{path}` vira o caminho do artefato relativo ao repositório e `{name}`
/// o nome do arquivo.
#[derive(Debug, Clone)]
pub struct CommandSync {
    repo_dir: PathBuf,
    commands: Vec<Vec<String>>,
}

impl CommandSync {
    pub fn new(repo_dir: impl Into<PathBuf>, commands: Vec<Vec<String>>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            commands,
        }
    }

    /// `None` se a sincronização está desabilitada.
    pub fn from_config(config: &SyncConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.repo_dir.clone(), config.commands.clone()))
    }

    /// Garante que o artefato está dentro do repositório; copia se preciso.
    /// Retorna o caminho relativo ao repositório.
    fn stage(&self, artifact: &Path) -> Result<PathBuf, SyncError> {
        let repo = fs::canonicalize(&self.repo_dir).map_err(|source| SyncError::Repository {
            path: self.repo_dir.clone(),
            source,
        })?;
        let copy_err = |source| SyncError::Copy {
            path: artifact.to_path_buf(),
            source,
        };
        let source = fs::canonicalize(artifact).map_err(copy_err)?;

        if let Ok(relative) = source.strip_prefix(&repo) {
            return Ok(relative.to_path_buf());
        }

        let name = source.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("export"));
        fs::copy(&source, repo.join(&name)).map_err(copy_err)?;
        debug!("{} copiado para {}", source.display(), repo.display());
        Ok(name)
    }
}

impl RemoteSync for CommandSync {
    fn push(&self, artifact: &Path) -> Result<SyncReport, SyncError> {
        if self.commands.is_empty() {
            return Err(SyncError::NotConfigured);
        }

        let relative = self.stage(artifact)?;
        let path_text = relative.to_string_lossy().into_owned();
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_text.clone());

        let mut report = SyncReport {
            artifact: artifact.to_path_buf(),
            commands: Vec::with_capacity(self.commands.len()),
        };

        for template in &self.commands {
            let args: Vec<String> = template
                .iter()
                .map(|a| a.replace("{path}", &path_text).replace("{name}", &name))
                .collect();
            let Some((program, rest)) = args.split_first() else {
                return Err(SyncError::NotConfigured);
            };
            let command = args.join(" ");

            let out = Command::new(program)
                .args(rest)
                .current_dir(&self.repo_dir)
                .output()
                .map_err(|source| SyncError::Spawn {
                    command: command.clone(),
                    source,
                })?;

            let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&out.stderr));

            if !out.status.success() {
                return Err(SyncError::CommandFailed {
                    command,
                    status: out.status.to_string(),
                    output,
                });
            }
            debug!("`{command}` ok");
            report.commands.push(CommandOutput { command, output });
        }

        info!("{} sincronizado com {}", name, self.repo_dir.display());
        Ok(report)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[test]
    fn runs_commands_with_substitution() {
        let repo = tempfile::tempdir().unwrap();
        let artifact = repo.path().join("datos.csv");
        fs::write(&artifact, "Timestamp\n").unwrap();

        let sync = CommandSync::new(repo.path(), vec![sh("echo add {path}"), sh("echo commit {name}")]);
        let report = sync.push(&artifact).unwrap();
        assert_eq!(report.commands.len(), 2);
        assert_eq!(report.commands[0].output.trim(), "add datos.csv");
        assert_eq!(report.commands[1].output.trim(), "commit datos.csv");
    }

    #[test]
    fn artifact_outside_repo_is_copied_in() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifact = out.path().join("datos_20240101_000000.xlsx");
        fs::write(&artifact, b"xlsx").unwrap();

        let sync = CommandSync::new(repo.path(), vec![sh("test -f {path}")]);
        sync.push(&artifact).unwrap();
        assert_eq!(fs::read(repo.path().join("datos_20240101_000000.xlsx")).unwrap(), b"xlsx");
    }

    #[test]
    fn failure_reports_output_verbatim_and_stops() {
        let repo = tempfile::tempdir().unwrap();
        let artifact = repo.path().join("a.csv");
        fs::write(&artifact, "x").unwrap();

        let sync = CommandSync::new(
            repo.path(),
            vec![sh("echo rejeitado >&2; exit 3"), sh("touch nao_deveria")],
        );
        match sync.push(&artifact) {
            Err(SyncError::CommandFailed { output, .. }) => assert_eq!(output.trim(), "rejeitado"),
            other => panic!("esperado CommandFailed, obtido {other:?}"),
        }
        assert!(!repo.path().join("nao_deveria").exists());
        // Artefato local intacto
        assert_eq!(fs::read_to_string(&artifact).unwrap(), "x");
    }

    #[test]
    fn missing_repo_is_an_error() {
        let out = tempfile::tempdir().unwrap();
        let artifact = out.path().join("a.csv");
        fs::write(&artifact, "x").unwrap();
        let sync = CommandSync::new(out.path().join("nao_existe"), vec![sh("true")]);
        assert!(matches!(sync.push(&artifact), Err(SyncError::Repository { .. })));
    }

    #[test]
    fn disabled_config_builds_nothing() {
        assert!(CommandSync::from_config(&SyncConfig::default()).is_none());
    }
}

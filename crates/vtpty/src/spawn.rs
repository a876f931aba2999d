use std::ffi::CStr;
use std::path::PathBuf;

/// How to resolve and spawn the child shell.
///
/// Shell resolution order, matching a plain terminal's fallback chain:
/// an explicit command, then `$SHELL`, then the `/etc/passwd` entry for
/// the current user, then [`SpawnConfig::default_shell`].
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    /// Explicit argv to exec instead of a shell, e.g. from `-e`.
    pub cmd: Option<Vec<String>>,
    /// Value to export as `TERM`.
    pub term_name: String,
    /// Used only if no shell can be found any other way.
    pub default_shell: String,
    /// Tee all PTY output to this path (`-` means stdout), mirroring the
    /// `-o`/`io` debugging option.
    pub io_tee: Option<PathBuf>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            cmd: None,
            term_name: "xterm-256color".to_string(),
            default_shell: "/bin/sh".to_string(),
            io_tee: None,
        }
    }
}

/// The passwd-database fields this crate actually needs.
pub(crate) struct PasswdEntry {
    pub name: String,
    pub dir: String,
    pub shell: Option<String>,
}

/// Look up the passwd entry for the calling process's real uid.
///
/// # Safety
/// Calls `getpwuid(3)`, which is not thread-safe with respect to other
/// callers of the `getpw*`/`getgr*` family; this is fine for a
/// single-threaded process spawn path.
pub(crate) fn current_user() -> Option<PasswdEntry> {
    unsafe {
        let uid = libc::getuid();
        let pw = libc::getpwuid(uid);
        if pw.is_null() {
            return None;
        }
        let name = CStr::from_ptr((*pw).pw_name).to_string_lossy().into_owned();
        let dir = CStr::from_ptr((*pw).pw_dir).to_string_lossy().into_owned();
        let shell_raw = CStr::from_ptr((*pw).pw_shell).to_string_lossy().into_owned();
        let shell = if shell_raw.is_empty() { None } else { Some(shell_raw) };
        Some(PasswdEntry { name, dir, shell })
    }
}

/// Resolve the argv to exec, in fallback order: `config.cmd`, `$SHELL`,
/// the passwd entry's shell, then `config.default_shell`.
pub(crate) fn resolve_argv(config: &SpawnConfig, passwd: &PasswdEntry) -> Vec<String> {
    if let Some(cmd) = &config.cmd {
        if !cmd.is_empty() {
            return cmd.clone();
        }
    }

    let shell = std::env::var("SHELL")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| passwd.shell.clone())
        .unwrap_or_else(|| config.default_shell.clone());

    vec![shell]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_cmd_wins_over_everything() {
        let config = SpawnConfig {
            cmd: Some(vec!["/usr/bin/htop".to_string()]),
            ..SpawnConfig::default()
        };
        let passwd = PasswdEntry {
            name: "x".to_string(),
            dir: "/home/x".to_string(),
            shell: Some("/bin/zsh".to_string()),
        };
        assert_eq!(resolve_argv(&config, &passwd), vec!["/usr/bin/htop".to_string()]);
    }

    #[test]
    fn falls_back_to_passwd_shell_without_cmd_or_env() {
        std::env::remove_var("SHELL");
        let config = SpawnConfig::default();
        let passwd = PasswdEntry {
            name: "x".to_string(),
            dir: "/home/x".to_string(),
            shell: Some("/bin/zsh".to_string()),
        };
        assert_eq!(resolve_argv(&config, &passwd), vec!["/bin/zsh".to_string()]);
    }

    #[test]
    fn falls_back_to_default_shell_when_nothing_else_resolves() {
        std::env::remove_var("SHELL");
        let config = SpawnConfig::default();
        let passwd = PasswdEntry { name: "x".to_string(), dir: "/home/x".to_string(), shell: None };
        assert_eq!(resolve_argv(&config, &passwd), vec![config.default_shell.clone()]);
    }
}

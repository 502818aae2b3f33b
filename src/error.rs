use std::io;

use thiserror::Error;

/// Failures the shell reports and then carries on from. `Display` is the
/// exact text shown to the user.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: nix::Error,
    },

    #[error("{program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: nix::Error,
    },

    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cd: {path}: {source}")]
    ChangeDir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("wait for pid {pid}: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[error("{program}: argument contains a NUL byte")]
    NulArgument { program: String },
}

pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;

    #[test]
    fn messages_name_the_culprit() {
        let err = ShellError::Exec {
            program: "badcommandxyz".to_string(),
            source: Errno::ENOENT,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("badcommandxyz: "), "{msg}");
        assert!(msg.contains("No such file or directory"), "{msg}");

        let err = ShellError::ChangeDir {
            path: "/nowhere".to_string(),
            source: io::Error::from_raw_os_error(libc::ENOENT),
        };
        assert!(err.to_string().starts_with("cd: /nowhere: No such file or directory"));
    }
}

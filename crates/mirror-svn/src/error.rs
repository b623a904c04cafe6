use thiserror::Error;

#[derive(Debug, Error)]
pub enum SvnError {
    #[error("cannot run '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{command}' exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("invalid date '{value}' in r{revision}: {source}")]
    Date {
        revision: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid changed path in r{revision}: {source}")]
    ChangedPath {
        revision: u64,
        #[source]
        source: mirror_core::CoreError,
    },
    #[error("output is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

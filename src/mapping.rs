use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::{debug, trace, warn};

use crate::colormap::ColormapTable;
use crate::error::{ColormapError, Result};
use crate::schema::{RecordContext, validate_record};

pub const COLORMAP_FILE_NAME: &str = "colormaps.toml";
pub const SECTION_PREFIX: &str = "class_";

/// Origin reported for documents parsed from a string.
const IN_MEMORY_ORIGIN: &str = "<string>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// File looked up directly inside the data directory.
    pub file_name: String,
    /// Sections are named `<section_prefix><selector>`.
    pub section_prefix: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            file_name: COLORMAP_FILE_NAME.to_string(),
            section_prefix: SECTION_PREFIX.to_string(),
        }
    }
}

/// Reads `colormaps.toml` files and builds [`ColormapTable`]s from them.
///
/// Holds no state besides its config: every call re-reads and re-parses.
#[derive(Debug, Clone, Default)]
pub struct ColormapLoader {
    pub config: LoaderConfig,
}

impl ColormapLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn colormap_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.config.file_name)
    }

    pub fn section_key(&self, selector: usize) -> String {
        format!("{}{}", self.config.section_prefix, selector)
    }

    /// Loads section `class_<selector>` from `<data_dir>/colormaps.toml`.
    ///
    /// The first invalid record aborts the load; later records with an
    /// already-seen name replace the earlier entry.
    pub fn load(&self, data_dir: impl AsRef<Path>, selector: usize) -> Result<ColormapTable> {
        let path = self.colormap_path(data_dir.as_ref());
        let document = read_document(&path)?;
        self.build_table(&path, &document, selector)
    }

    /// Same as [`load`](Self::load) but for text already in memory.
    /// `origin` is only used in error messages.
    pub fn parse_str(
        &self,
        contents: &str,
        origin: impl AsRef<Path>,
        selector: usize,
    ) -> Result<ColormapTable> {
        let path = origin.as_ref();
        let document = parse_document(path, contents)?;
        self.build_table(path, &document, selector)
    }

    /// Selectors of every `class_<N>` section in the file, ascending.
    pub fn sections(&self, data_dir: impl AsRef<Path>) -> Result<Vec<usize>> {
        let path = self.colormap_path(data_dir.as_ref());
        let document = read_document(&path)?;
        let mut selectors: Vec<usize> = document
            .keys()
            .filter_map(|key| {
                let selector = key
                    .strip_prefix(self.config.section_prefix.as_str())?
                    .parse()
                    .ok()?;
                // `class_01` parses to 1 but `load(1)` looks up `class_1`
                (self.section_key(selector) == *key).then_some(selector)
            })
            .collect();
        selectors.sort_unstable();
        selectors.dedup();
        Ok(selectors)
    }

    fn build_table(&self, path: &Path, document: &Table, selector: usize) -> Result<ColormapTable> {
        let key = self.section_key(selector);
        let Some(section) = document.get(&key) else {
            return Err(ColormapError::MissingSection {
                path: path.to_path_buf(),
                key,
                available: document.keys().cloned().collect(),
            });
        };
        let Value::Array(records) = section else {
            return Err(ColormapError::InvalidSection {
                path: path.to_path_buf(),
                key,
                actual: section.type_str().to_string(),
                value: section.to_string(),
            });
        };

        let mut table = ColormapTable::new();
        for (index, value) in records.iter().enumerate() {
            let ctx = RecordContext {
                path,
                section: &key,
                index,
            };
            let (name, entry) = validate_record(ctx, value)?;
            trace!(section = %key, index, %name, id = entry.id, "accepted colormap entry");
            if table.contains(&name) {
                warn!(
                    path = %path.display(),
                    section = %key,
                    index,
                    %name,
                    "duplicate class name, later entry replaces earlier one"
                );
            }
            table.insert(name, entry);
        }

        debug!(
            path = %path.display(),
            section = %key,
            classes = table.len(),
            "loaded colormap"
        );
        Ok(table)
    }
}

fn read_document(path: &Path) -> Result<Table> {
    debug!(path = %path.display(), "reading colormap file");
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ColormapError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ColormapError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let contents = String::from_utf8(bytes).map_err(|e| ColormapError::Malformed {
        path: path.to_path_buf(),
        message: format!("file is not valid UTF-8: {e}"),
    })?;
    parse_document(path, &contents)
}

fn parse_document(path: &Path, contents: &str) -> Result<Table> {
    contents
        .parse::<Table>()
        .map_err(|e| ColormapError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string().trim_end().to_string(),
        })
}

/// Loads `class_<selector>` from `<data_dir>/colormaps.toml` with the default config.
pub fn load_colormap(data_dir: impl AsRef<Path>, selector: usize) -> Result<ColormapTable> {
    ColormapLoader::default().load(data_dir, selector)
}

pub fn parse_colormap_str(contents: &str, selector: usize) -> Result<ColormapTable> {
    ColormapLoader::default().parse_str(contents, IN_MEMORY_ORIGIN, selector)
}

pub fn available_selectors(data_dir: impl AsRef<Path>) -> Result<Vec<usize>> {
    ColormapLoader::default().sections(data_dir)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::colormap::{ClassEntry, Rgb};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn warnings_while(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs.contents()
    }

    const TWO_CLASSES: &str = r#"
[[class_0]]
Classes = "unlabeled"
R = 0
G = 0
B = 0
Id = 0

[[class_0]]
Classes = "paved-area"
R = 128
G = 64
B = 128
Id = 1
"#;

    #[test]
    fn parses_two_classes() {
        let table = parse_colormap_str(TWO_CLASSES, 0).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("unlabeled"), Some(&ClassEntry::new((0, 0, 0), 0)));
        assert_eq!(table.get("paved-area").map(|e| e.color), Some(Rgb(128, 64, 128)));
    }

    #[test]
    fn section_key_uses_prefix() {
        let loader = ColormapLoader::new(LoaderConfig {
            file_name: "palette.toml".into(),
            section_prefix: "palette_".into(),
        });
        assert_eq!(loader.section_key(4), "palette_4");
        assert_eq!(
            loader.colormap_path(Path::new("assets")),
            Path::new("assets").join("palette.toml")
        );
    }

    #[test]
    fn missing_section_lists_present_keys() {
        let err = parse_colormap_str(TWO_CLASSES, 1).unwrap_err();
        match &err {
            ColormapError::MissingSection { key, available, .. } => {
                assert_eq!(key, "class_1");
                assert_eq!(available, &vec!["class_0".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Available keys: [class_0]"));
    }

    #[test]
    fn syntax_error_is_malformed() {
        let err = parse_colormap_str("[[class_0]\nClasses = ", 0).unwrap_err();
        match err {
            ColormapError::Malformed { path, message } => {
                assert_eq!(path, Path::new(IN_MEMORY_ORIGIN));
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn plain_table_section_is_rejected() {
        let err = parse_colormap_str("[class_0]\nClasses = \"x\"\n", 0).unwrap_err();
        match &err {
            ColormapError::InvalidSection { key, actual, .. } => {
                assert_eq!(key, "class_0");
                assert_eq!(actual, "table");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("[[class_0]]"), "{message}");
        assert!(!message.contains("entry #"), "{message}");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn empty_inline_section_yields_empty_table() {
        let table = parse_colormap_str("class_2 = []\n", 2).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn first_bad_record_aborts_load() {
        let contents = format!("{TWO_CLASSES}\n[[class_0]]\nClasses = \"dirt\"\nR = 1\nG = 2\nB = 3\n");
        let err = parse_colormap_str(&contents, 0).unwrap_err();
        match err {
            ColormapError::MissingField { field, index, .. } => {
                assert_eq!(field, "Id");
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_name_logs_a_warning() {
        let contents = format!("{TWO_CLASSES}\n[[class_0]]\nClasses = \"unlabeled\"\nR = 9\nG = 9\nB = 9\nId = 5\n");
        let mut table = None;
        let logs = warnings_while(|| table = Some(parse_colormap_str(&contents, 0)));

        let table = table.unwrap().unwrap();
        assert_eq!(table.get("unlabeled"), Some(&ClassEntry::new((9, 9, 9), 5)));
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("duplicate class name"), "{logs}");
        assert!(logs.contains("unlabeled"), "{logs}");
        assert!(logs.contains("index=2"), "{logs}");
    }

    #[test]
    fn unique_names_log_no_warning() {
        let logs = warnings_while(|| {
            parse_colormap_str(TWO_CLASSES, 0).unwrap();
        });
        assert!(logs.is_empty(), "{logs}");
    }
}

use std::path::Path;

/// Supported workload types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadType {
    JavaScript,
    Python,
    Binary,
}

impl WorkloadType {
    /// Interpreter binary name inside the Nanvix registry
    pub fn binary_name(&self) -> &'static str {
        match self {
            WorkloadType::JavaScript => "qjs",
            WorkloadType::Python => "python3",
            WorkloadType::Binary => "binary",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            WorkloadType::JavaScript => &["js", "mjs"],
            WorkloadType::Python => &["py"],
            WorkloadType::Binary => &["elf", "o"],
        }
    }

    /// Whether the workload needs an interpreter at all
    pub fn is_scripted(&self) -> bool {
        !matches!(self, WorkloadType::Binary)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkloadType::JavaScript => "JavaScript",
            WorkloadType::Python => "Python",
            WorkloadType::Binary => "binary",
        }
    }

    /// Detect workload type from the file extension. An extensionless path
    /// that is an existing file is treated as a binary.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();

        match path.extension() {
            Some(ext) => {
                let ext = ext.to_str()?.to_lowercase();
                [Self::JavaScript, Self::Python, Self::Binary]
                    .into_iter()
                    .find(|t| t.extensions().contains(&ext.as_str()))
            }
            None if path.is_file() => Some(Self::Binary),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_type_detection() {
        assert_eq!(WorkloadType::from_path("script.js"), Some(WorkloadType::JavaScript));
        assert_eq!(WorkloadType::from_path("module.mjs"), Some(WorkloadType::JavaScript));
        assert_eq!(WorkloadType::from_path("SCRIPT.JS"), Some(WorkloadType::JavaScript));
        assert_eq!(WorkloadType::from_path("script.py"), Some(WorkloadType::Python));
        assert_eq!(WorkloadType::from_path("hello.elf"), Some(WorkloadType::Binary));
        assert_eq!(WorkloadType::from_path("hello.o"), Some(WorkloadType::Binary));
        assert_eq!(WorkloadType::from_path("unknown.txt"), None);
    }

    #[test]
    fn test_extensionless_paths() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("hello");
        std::fs::write(&bin, b"\x7fELF").unwrap();

        assert_eq!(WorkloadType::from_path(&bin), Some(WorkloadType::Binary));
        assert_eq!(WorkloadType::from_path(dir.path().join("missing")), None);
        assert_eq!(WorkloadType::from_path(dir.path()), None);
    }

    #[test]
    fn test_binary_names() {
        assert_eq!(WorkloadType::JavaScript.binary_name(), "qjs");
        assert_eq!(WorkloadType::Python.binary_name(), "python3");
        assert!(!WorkloadType::Binary.is_scripted());
        assert!(WorkloadType::Python.is_scripted());
    }
}

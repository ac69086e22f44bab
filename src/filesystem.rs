use std::fmt::Display;

/// A ZFS filesystem: either a pool's root dataset or a dataset inside it.
///
/// Neither `pool` nor `dataset` may contain `/` or `@`; this is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filesystem {
    pool: String,
    dataset: Option<String>,
}

impl Filesystem {
    pub fn new(pool: impl Into<String>, dataset: Option<impl Into<String>>) -> Self {
        Self {
            pool: pool.into(),
            dataset: dataset.map(Into::into),
        }
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    /// The name `zfs` knows this filesystem by, `pool` or `pool/dataset`.
    pub fn name(&self) -> String {
        let Self { pool, dataset } = self;
        match dataset {
            Some(dataset) => format!("{pool}/{dataset}"),
            None => pool.clone(),
        }
    }
}

impl Display for Filesystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name() {
        let filesystem = Filesystem::new("hpool", Some("mydataset"));
        assert_eq!(filesystem.name(), "hpool/mydataset");
    }

    #[test]
    fn root_name() {
        let filesystem = Filesystem::new("hpool", None::<String>);
        assert_eq!(filesystem.name(), "hpool");
        assert_eq!(filesystem.dataset(), None);
    }

    #[test]
    fn display_is_name() {
        let filesystem = Filesystem::new("tank", Some("volumes"));
        assert_eq!(filesystem.to_string(), filesystem.name());
    }
}

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::EmbeddingIndex;
use crate::error::{Error, Result};

/// 向量快照的持久化格式
///
/// `embeddings` 的第 `i` 行对应 `paths` 的第 `i` 个文件名。
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub embeddings: Vec<Vec<f32>>,
    pub paths: Vec<String>,
}

impl From<&EmbeddingIndex> for Snapshot {
    fn from(index: &EmbeddingIndex) -> Self {
        Self { embeddings: index.rows(), paths: index.paths().to_vec() }
    }
}

impl TryFrom<Snapshot> for EmbeddingIndex {
    type Error = Error;

    fn try_from(snapshot: Snapshot) -> Result<Self> {
        EmbeddingIndex::from_rows(snapshot.paths, snapshot.embeddings)
    }
}

/// 读取快照，任何结构错误都视为快照损坏
pub fn read_snapshot(path: &Path) -> Result<EmbeddingIndex> {
    let reader = BufReader::new(File::open(path)?);
    let snapshot: Snapshot =
        serde_json::from_reader(reader).map_err(|e| Error::CorruptSnapshot(e.to_string()))?;
    EmbeddingIndex::try_from(snapshot).map_err(|e| Error::CorruptSnapshot(e.to_string()))
}

/// 写入快照，先写临时文件再重命名，避免写到一半时留下损坏的快照
pub fn write_snapshot(index: &EmbeddingIndex, path: &Path, tmp_path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(tmp_path)?);
    serde_json::to_writer(&mut writer, &Snapshot::from(index))?;
    writer.flush()?;
    drop(writer);
    std::fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(content: &str) -> Result<EmbeddingIndex> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        std::fs::write(&path, content).unwrap();
        read_snapshot(&path)
    }

    #[test]
    fn test_read_valid() {
        let index = read_str(r#"{"embeddings": [[1.0, 0.0], [0.0, 1.0]], "paths": ["a.png", "b.png"]}"#)
            .unwrap();
        assert_eq!(index.paths(), ["a.png", "b.png"]);
        assert_eq!(index.dim(), Some(2));
    }

    #[test]
    fn test_read_empty() {
        let index = read_str(r#"{"embeddings": [], "paths": []}"#).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_read_corrupt() {
        let cases = [
            r#"[1, 2, 3]"#,
            r#"{"paths": ["a.png"]}"#,
            r#"{"embeddings": [[1.0]]}"#,
            r#"{"embeddings": [[1.0]], "paths": [1]}"#,
            r#"{"embeddings": [[1.0], [0.5]], "paths": ["a.png"]}"#,
            r#"{"embeddings": [[1.0, 0.0], [0.5]], "paths": ["a.png", "b.png"]}"#,
            r#"{"embeddings": [[1.0], [0.5]], "paths": ["a.png", "a.png"]}"#,
            "not json",
        ];
        for case in cases {
            assert!(
                matches!(read_str(case), Err(Error::CorruptSnapshot(_))),
                "snapshot should be rejected: {case}"
            );
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        let tmp = dir.path().join("embeddings.json.tmp");
        let index = EmbeddingIndex::from_rows(
            vec!["b.png".into(), "a.png".into()],
            vec![vec![0.6, 0.8], vec![1.0, 0.0]],
        )
        .unwrap();

        write_snapshot(&index, &path, &tmp).unwrap();

        assert!(!tmp.exists());
        assert_eq!(read_snapshot(&path).unwrap(), index);
    }
}

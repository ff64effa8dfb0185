use std::collections::HashSet;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Error, Result};

/// 图片向量索引
///
/// 路径与向量按相同顺序保存，第 `i` 个路径对应第 `i` 行向量。
/// 所有修改都通过这里的方法进行，因此不会出现路径重复、数量或维度不一致的情况。
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingIndex {
    paths: Vec<String>,
    vectors: Array2<f32>,
}

impl Default for EmbeddingIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl EmbeddingIndex {
    pub fn empty() -> Self {
        Self { paths: vec![], vectors: Array2::zeros((0, 0)) }
    }

    /// 使用平行的路径列表和向量矩阵创建索引
    pub fn new(paths: Vec<String>, vectors: Array2<f32>) -> Result<Self> {
        if paths.len() != vectors.nrows() {
            return Err(Error::IndexInconsistency { paths: paths.len(), vectors: vectors.nrows() });
        }
        let mut seen = HashSet::with_capacity(paths.len());
        if let Some(dup) = paths.iter().find(|path| !seen.insert(path.as_str())) {
            return Err(Error::DuplicatePath(dup.clone()));
        }
        if paths.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self { paths, vectors })
    }

    /// 使用路径列表和逐行的向量创建索引，每行长度必须一致
    pub fn from_rows(paths: Vec<String>, rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != dim) {
            return Err(Error::DimensionMismatch { expected: dim, actual: row.len() });
        }
        let vectors = Array2::from_shape_vec((rows.len(), dim), rows.into_iter().flatten().collect())?;
        Self::new(paths, vectors)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// 向量维度，空索引没有确定的维度
    pub fn dim(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.vectors.ncols())
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn vectors(&self) -> ArrayView2<'_, f32> {
        self.vectors.view()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// 按顺序返回 `(路径, 向量)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, ArrayView1<'_, f32>)> {
        self.paths.iter().map(String::as_str).zip(self.vectors.outer_iter())
    }

    /// 逐行导出向量
    pub fn rows(&self) -> Vec<Vec<f32>> {
        self.vectors.outer_iter().map(|row| row.to_vec()).collect()
    }

    /// 检查路径数量与向量数量是否一致
    pub fn check_consistency(&self) -> Result<()> {
        if self.paths.len() != self.vectors.nrows() {
            return Err(Error::IndexInconsistency {
                paths: self.paths.len(),
                vectors: self.vectors.nrows(),
            });
        }
        Ok(())
    }

    /// 追加一条记录，失败时索引保持不变
    pub fn push(&mut self, path: impl Into<String>, vector: &[f32]) -> Result<()> {
        let path = path.into();
        if self.contains(&path) {
            return Err(Error::DuplicatePath(path));
        }
        if self.is_empty() {
            self.vectors = Array2::from_shape_vec((1, vector.len()), vector.to_vec())?;
        } else {
            let expected = self.vectors.ncols();
            if vector.len() != expected {
                return Err(Error::DimensionMismatch { expected, actual: vector.len() });
            }
            self.vectors.push_row(ArrayView1::from(vector))?;
        }
        self.paths.push(path);
        Ok(())
    }

    /// 只保留满足条件的记录，返回被删除的数量
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let rows = (0..self.paths.len()).filter(|&i| keep(&self.paths[i])).collect::<Vec<_>>();
        let removed = self.paths.len() - rows.len();
        if removed == 0 {
            return 0;
        }
        let paths = rows.iter().map(|&i| self.paths[i].clone()).collect();
        self.vectors = self.vectors.select(Axis(0), &rows);
        self.paths = paths;
        removed
    }

    /// 计算查询向量与所有记录的点积
    pub fn similarities(&self, query: &[f32]) -> Result<Array1<f32>> {
        match self.dim() {
            None => Ok(Array1::zeros(0)),
            Some(dim) if dim != query.len() => {
                Err(Error::DimensionMismatch { expected: dim, actual: query.len() })
            }
            Some(_) => Ok(self.vectors.dot(&ArrayView1::from(query))),
        }
    }
}

// ==========================================
// 表单数据导入器 - 批次读取器
// ==========================================
// 支持: CSV (.csv) 流式读取 / Excel (.xlsx/.xls) 首个工作表 / 内存记录
// 行号: 运行内从 1 开始的数据行序号（不含表头）
// 全空行: 跳过但占用行号
// ==========================================

use crate::config::ImportConfig;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::form_data_importer_trait::{Bunch, BunchReader, RawRecord};
use calamine::{open_workbook_auto, Reader};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

fn to_record(headers: &[String], values: impl Iterator<Item = String>) -> RawRecord {
    headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .map(|(header, value)| (header.clone(), value.trim().to_string()))
        .collect()
}

fn is_blank(record: &RawRecord) -> bool {
    record.values().all(|v| v.is_empty())
}

// ==========================================
// CSV 批次读取器
// ==========================================
pub struct CsvBunchReader {
    path: PathBuf,
    delimiter: u8,
    bunch_size: usize,
    reader: csv::Reader<File>,
    headers: Vec<String>,
    next_row_number: usize,
}

impl CsvBunchReader {
    pub fn open(path: &Path, delimiter: u8, bunch_size: usize) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let (reader, headers) = Self::open_reader(path, delimiter)?;
        debug!(path = %path.display(), columns = headers.len(), "打开 CSV 文件");

        Ok(Self {
            path: path.to_path_buf(),
            delimiter,
            bunch_size: bunch_size.max(1),
            reader,
            headers,
            next_row_number: 1,
        })
    }

    fn open_reader(path: &Path, delimiter: u8) -> ImportResult<(csv::Reader<File>, Vec<String>)> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        Ok((reader, headers))
    }
}

impl BunchReader for CsvBunchReader {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn rewind(&mut self) -> ImportResult<()> {
        let (reader, headers) = Self::open_reader(&self.path, self.delimiter)?;
        self.reader = reader;
        self.headers = headers;
        self.next_row_number = 1;
        Ok(())
    }

    fn next_bunch(&mut self) -> ImportResult<Option<Bunch>> {
        let mut bunch = Vec::with_capacity(self.bunch_size);
        let mut raw = StringRecord::new();

        while bunch.len() < self.bunch_size {
            if !self.reader.read_record(&mut raw)? {
                break;
            }

            let row_number = self.next_row_number;
            self.next_row_number += 1;

            let record = to_record(&self.headers, raw.iter().map(str::to_string));
            if is_blank(&record) {
                continue;
            }
            bunch.push((row_number, record));
        }

        Ok(if bunch.is_empty() { None } else { Some(bunch) })
    }
}

// ==========================================
// Excel 批次读取器
// ==========================================
// calamine 一次性加载工作表，批次从内存游标产出
pub struct ExcelBunchReader {
    inner: MemoryBunchReader,
}

impl ExcelBunchReader {
    pub fn open(path: &Path, bunch_size: usize) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无表头行".to_string()))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 全空行保留为空记录，由 MemoryBunchReader 跳过并占用行号
        let records: Vec<RawRecord> = rows
            .map(|row| to_record(&headers, row.iter().map(|cell| cell.to_string())))
            .collect();

        debug!(path = %path.display(), sheet = %sheet_name, rows = records.len(), "打开 Excel 文件");
        Ok(Self {
            inner: MemoryBunchReader::new(headers, records, bunch_size),
        })
    }
}

impl BunchReader for ExcelBunchReader {
    fn headers(&self) -> &[String] {
        self.inner.headers()
    }

    fn rewind(&mut self) -> ImportResult<()> {
        self.inner.rewind()
    }

    fn next_bunch(&mut self) -> ImportResult<Option<Bunch>> {
        self.inner.next_bunch()
    }
}

// ==========================================
// 内存批次读取器
// ==========================================
pub struct MemoryBunchReader {
    headers: Vec<String>,
    records: Vec<RawRecord>,
    bunch_size: usize,
    cursor: usize,
}

impl MemoryBunchReader {
    pub fn new(headers: Vec<String>, records: Vec<RawRecord>, bunch_size: usize) -> Self {
        Self {
            headers,
            records,
            bunch_size: bunch_size.max(1),
            cursor: 0,
        }
    }

    /// 按表头顺序从值行构建
    pub fn from_rows<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>], bunch_size: usize) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let records = rows
            .iter()
            .map(|values| to_record(&headers, values.iter().map(|v| v.as_ref().to_string())))
            .collect();
        Self::new(headers, records, bunch_size)
    }
}

impl BunchReader for MemoryBunchReader {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn rewind(&mut self) -> ImportResult<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next_bunch(&mut self) -> ImportResult<Option<Bunch>> {
        let mut bunch = Vec::with_capacity(self.bunch_size);

        while bunch.len() < self.bunch_size && self.cursor < self.records.len() {
            let record = &self.records[self.cursor];
            self.cursor += 1;
            if is_blank(record) {
                continue;
            }
            bunch.push((self.cursor, record.clone()));
        }

        Ok(if bunch.is_empty() { None } else { Some(bunch) })
    }
}

// ==========================================
// 根据扩展名选择读取器
// ==========================================
pub fn open_bunch_reader(path: &Path, config: &ImportConfig) -> ImportResult<Box<dyn BunchReader>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let bunch_size = config.effective_bunch_size();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvBunchReader::open(
            path,
            config.field_separator,
            bunch_size,
        )?)),
        "xlsx" | "xls" => Ok(Box::new(ExcelBunchReader::open(path, bunch_size)?)),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

// Manages the fixed-size pages of a single database file.
//
// The file is a flat sequence of PAGE_SIZE pages, numbered from 0.  There is no file header,
// magic number or checksum: page 0 is the root leaf of the table's btree.
//
// The pager owns the data in each page, and allows callers to access it for reading or writing.
// Goal is to avoid copying pages.
// Pages are loaded on demand and stay resident until the pager is closed; there is no eviction,
// so the number of pages is bounded by TABLE_MAX_PAGES.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info, warn};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Pager: Tried to fetch page number out of bounds: {0}.")]
    PageNumberBeyondLimits(PageNum),
    #[error("Pager: Tried to flush page {0}, which is not in memory.")]
    FlushNonResidentPage(PageNum),
    #[error("Pager: Error accessing database file: {0}")]
    Io(#[from] std::io::Error),
}

// Page numbers are 0-based; page 0 is the root page of the table.
pub type PageNum = u32;

pub const PAGE_SIZE: usize = 4096;

pub const TABLE_MAX_PAGES: usize = 100;

pub type Page = [u8; PAGE_SIZE];

pub struct Pager {
    f: File,
    file_length: u64,
    num_pages: u32,
    /// Indexed by page number.  `None` until the page is first requested.
    pages: Vec<Option<Box<Page>>>,
}

/// Reads as much of `buf` as the file has left, leaving the remainder untouched.
fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl Pager {
    /// Opens the database file at `path` for reading and writing, creating it if needed.
    ///
    /// No pages are read until they are requested with `get_page`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut f = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path.as_ref())?;
        let file_length = f.seek(SeekFrom::End(0))?;
        let mut num_pages = (file_length / PAGE_SIZE as u64) as u32;
        // We might have saved a partial page at the end of the file.
        if file_length % PAGE_SIZE as u64 != 0 {
            warn!(
                file_length,
                "database file is not a whole number of pages; treating the tail as a partial page"
            );
            num_pages += 1;
        }
        info!(path = %path.as_ref().display(), file_length, num_pages, "opened database file");
        Ok(Pager {
            f,
            file_length,
            num_pages,
            pages: vec![],
        })
    }

    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    /// The number of pages the table spans, counting pages only present in memory so far.
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn is_resident(&self, pn: PageNum) -> bool {
        matches!(self.pages.get(pn as usize), Some(Some(_)))
    }

    fn pages_on_disk(&self) -> u64 {
        (self.file_length + PAGE_SIZE as u64 - 1) / PAGE_SIZE as u64
    }

    fn read_page_from_file(&mut self, pn: PageNum) -> Result<Box<Page>, Error> {
        let mut page = Box::new([0_u8; PAGE_SIZE]);
        // Pages past the end of the file have never been written; they start out zeroed.
        if (pn as u64) < self.pages_on_disk() {
            self.f
                .seek(SeekFrom::Start(pn as u64 * PAGE_SIZE as u64))?;
            let n = read_up_to(&mut self.f, &mut page[..])?;
            debug!(page = pn, bytes = n, "read page from file");
        } else {
            debug!(page = pn, "allocated fresh page");
        }
        Ok(page)
    }

    /// Returns the page `pn`, reading it from the file on first access.
    ///
    /// The returned buffer is the resident copy: writes through it are seen by later callers and
    /// reach the file when the page is flushed.
    pub fn get_page(&mut self, pn: PageNum) -> Result<&mut Page, Error> {
        if pn as usize >= TABLE_MAX_PAGES {
            return Err(Error::PageNumberBeyondLimits(pn));
        }
        let idx = pn as usize;
        if idx >= self.pages.len() {
            self.pages.resize_with(idx + 1, || None);
        }
        let page = match self.pages[idx].take() {
            Some(page) => page,
            None => {
                let page = self.read_page_from_file(pn)?;
                if pn >= self.num_pages {
                    self.num_pages = pn + 1;
                }
                page
            }
        };
        Ok(&mut **self.pages[idx].insert(page))
    }

    /// Writes the resident page `pn` back to its place in the file.
    pub fn flush(&mut self, pn: PageNum) -> Result<(), Error> {
        let page = match self.pages.get(pn as usize) {
            Some(Some(page)) => page,
            _ => return Err(Error::FlushNonResidentPage(pn)),
        };
        let offset = pn as u64 * PAGE_SIZE as u64;
        self.f.seek(SeekFrom::Start(offset))?;
        self.f.write_all(&page[..])?;
        self.file_length = self.file_length.max(offset + PAGE_SIZE as u64);
        debug!(page = pn, "flushed page");
        Ok(())
    }

    /// Flushes and releases every resident page, then closes the file.
    pub fn close(mut self) -> Result<(), Error> {
        for pn in 0..self.num_pages {
            if !self.is_resident(pn) {
                continue;
            }
            self.flush(pn)?;
            self.pages[pn as usize] = None;
        }
        // Dropping a File swallows errors, so surface them here instead.
        self.f.sync_all()?;
        info!(num_pages = self.num_pages, "closed database file");
        Ok(())
    }
}

#[cfg(test)]
fn scratch_path() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("Should have made a temp dir.");
    let path = dir.path().join("pager.db");
    (dir, path)
}

#[test]
fn test_open_creates_empty_file() {
    let (_dir, path) = scratch_path();
    let pager = Pager::open(&path).expect("Should have opened pager.");
    assert_eq!(pager.num_pages(), 0);
    assert_eq!(pager.file_length(), 0);
    assert!(path.exists());
}

#[test]
fn test_get_page_beyond_limits() {
    let (_dir, path) = scratch_path();
    let mut pager = Pager::open(&path).expect("Should have opened pager.");
    assert!(pager.get_page(TABLE_MAX_PAGES as PageNum - 1).is_ok());
    assert!(matches!(
        pager.get_page(TABLE_MAX_PAGES as PageNum),
        Err(Error::PageNumberBeyondLimits(100))
    ));
}

#[test]
fn test_get_page_tracks_highest_page() {
    let (_dir, path) = scratch_path();
    let mut pager = Pager::open(&path).expect("Should have opened pager.");
    pager.get_page(3).expect("Should have gotten a page");
    assert_eq!(pager.num_pages(), 4);
    pager.get_page(1).expect("Should have gotten a page");
    assert_eq!(pager.num_pages(), 4);
    assert!(pager.is_resident(1));
    assert!(!pager.is_resident(2));
}

#[test]
fn test_get_page_returns_same_buffer() {
    let (_dir, path) = scratch_path();
    let mut pager = Pager::open(&path).expect("Should have opened pager.");
    pager.get_page(0).expect("Should have gotten a page")[17] = 0xab;
    assert_eq!(pager.get_page(0).expect("Should have gotten a page")[17], 0xab);
}

#[test]
fn test_resident_page_keeps_its_buffer() {
    let (_dir, path) = scratch_path();
    let mut pager = Pager::open(&path).expect("Should have opened pager.");
    assert!(!pager.is_resident(3));
    let first = pager.get_page(3).expect("Should have gotten a page").as_ptr();
    assert!(pager.is_resident(3));
    let second = pager.get_page(3).expect("Should have gotten a page").as_ptr();
    assert_eq!(first, second);
    assert_eq!(pager.num_pages(), 4);
    assert!(!pager.is_resident(2));
}

#[test]
fn test_flush_non_resident_page() {
    let (_dir, path) = scratch_path();
    let mut pager = Pager::open(&path).expect("Should have opened pager.");
    assert!(matches!(pager.flush(2), Err(Error::FlushNonResidentPage(2))));
}

#[test]
fn test_close_and_reopen_keeps_pages() {
    let (_dir, path) = scratch_path();
    let mut pager = Pager::open(&path).expect("Should have opened pager.");
    pager.get_page(0).expect("Should have gotten a page")[0] = 1;
    pager.get_page(1).expect("Should have gotten a page")[PAGE_SIZE - 1] = 7;
    pager.close().expect("Should have closed pager.");

    let mut pager = Pager::open(&path).expect("Should have reopened pager.");
    assert_eq!(pager.file_length(), 2 * PAGE_SIZE as u64);
    assert_eq!(pager.num_pages(), 2);
    assert_eq!(pager.get_page(0).expect("Should have gotten a page")[0], 1);
    assert_eq!(
        pager.get_page(1).expect("Should have gotten a page")[PAGE_SIZE - 1],
        7
    );
}

#[test]
fn test_partial_trailing_page_is_zero_filled() {
    let (_dir, path) = scratch_path();
    std::fs::write(&path, [9_u8; PAGE_SIZE + 10]).expect("Should have written file.");
    let mut pager = Pager::open(&path).expect("Should have opened pager.");
    assert_eq!(pager.num_pages(), 2);
    let page = pager.get_page(1).expect("Should have gotten a page");
    assert_eq!(&page[..10], &[9_u8; 10]);
    assert!(page[10..].iter().all(|b| *b == 0));
}

//! Background discovery of the tilesets available in the VFS.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::tileset::{TilesetCodec, TilesetInfo, TilesetParseError};
use crate::vfs::{self, Vfs};

/// A tileset that parsed successfully, and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub info: TilesetInfo,
    pub location: String,
}

impl CatalogEntry {
    pub fn display_name(&self) -> &str {
        &self.info.display_name
    }
}

/// Tilesets keyed by unique name.
pub type Catalog = BTreeMap<String, CatalogEntry>;

/// Scans `base` synchronously.
///
/// Entries are visited in sorted name order. An entry that fails to open or
/// parse is logged and skipped; when two entries share a unique name the one
/// visited last wins. A directory that cannot be listed gives an empty catalog.
pub fn scan_catalog(vfs: &dyn Vfs, codec: &dyn TilesetCodec, base: &str) -> Catalog {
    let mut catalog = Catalog::new();

    let mut names = match vfs.list_directory(base) {
        Ok(names) => names,
        Err(err) => {
            log::warn!("cannot list tileset directory: {err}");
            return catalog;
        }
    };
    names.sort();

    for name in names {
        let location = vfs::join(base, &name);
        log::debug!("reading {location}");
        match read_entry(vfs, codec, &location) {
            Ok(info) => {
                log::info!("tileset `{}` ({}) at {location}", info.unique_name, info.display_name);
                let key = info.unique_name.clone();
                if let Some(old) = catalog.insert(key, CatalogEntry { info, location }) {
                    log::debug!("`{}` from {} was overridden", old.info.unique_name, old.location);
                }
            }
            Err(err) => log::warn!("skipping {location}: {err}"),
        }
    }

    catalog
}

fn read_entry(
    vfs: &dyn Vfs,
    codec: &dyn TilesetCodec,
    location: &str,
) -> Result<TilesetInfo, TilesetParseError> {
    let mut stream = vfs.open(location)?;
    codec.parse_metadata(&mut stream)
}

// ── CatalogScanner ────────────────────────────────────────────────────────

struct ScanResult {
    generation: u64,
    catalog: Catalog,
}

type Completion = Box<dyn FnOnce(Catalog)>;

/// Runs [`scan_catalog`] on a worker thread and delivers the result on the
/// thread that calls [`poll`](Self::poll).
///
/// Only the newest scan's callback ever runs. Starting a scan while another
/// is in flight drops the older callback unused and ignores its result.
pub struct CatalogScanner {
    vfs: Arc<dyn Vfs>,
    codec: Arc<dyn TilesetCodec>,
    tx: Sender<ScanResult>,
    rx: Receiver<ScanResult>,
    generation: u64,
    pending: Option<Completion>,
}

impl CatalogScanner {
    pub fn new(vfs: Arc<dyn Vfs>, codec: Arc<dyn TilesetCodec>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { vfs, codec, tx, rx, generation: 0, pending: None }
    }

    /// Starts scanning `base`. `on_complete` runs once, from a later `poll`.
    pub fn scan(&mut self, base: impl Into<String>, on_complete: impl FnOnce(Catalog) + 'static) {
        let base = base.into();
        if self.pending.is_some() {
            log::debug!("tileset scan {} superseded", self.generation);
        }
        self.generation += 1;
        self.pending = Some(Box::new(on_complete));

        let generation = self.generation;
        let vfs = Arc::clone(&self.vfs);
        let codec = Arc::clone(&self.codec);
        let tx = self.tx.clone();
        let worker_base = base.clone();
        let job = move || {
            let catalog = scan_catalog(vfs.as_ref(), codec.as_ref(), &worker_base);
            // The receiver lives as long as the scanner.
            let _ = tx.send(ScanResult { generation, catalog });
        };

        let spawned = thread::Builder::new().name(format!("tileset-scan-{generation}")).spawn(job);
        if let Err(err) = spawned {
            log::warn!("could not start scan thread ({err}); scanning inline");
            let catalog = scan_catalog(self.vfs.as_ref(), self.codec.as_ref(), &base);
            let _ = self.tx.send(ScanResult { generation, catalog });
        }
    }

    /// Delivers a finished scan, if any. Returns whether a callback ran.
    pub fn poll(&mut self) -> bool {
        while let Ok(result) = self.rx.try_recv() {
            if result.generation != self.generation {
                log::debug!("dropping stale tileset scan {}", result.generation);
                continue;
            }
            if let Some(on_complete) = self.pending.take() {
                log::info!("tileset scan finished: {} tileset(s)", result.catalog.len());
                on_complete(result.catalog);
                return true;
            }
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::tileset::JsonHeaderCodec;
    use crate::vfs::MemoryVfs;

    fn header(unique: &str, display: &str) -> Vec<u8> {
        format!(r#"{{"unique_name":"{unique}","display_name":"{display}"}}"#).into_bytes()
    }

    fn poll_until_done(scanner: &mut CatalogScanner) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while scanner.is_pending() {
            scanner.poll();
            assert!(Instant::now() < deadline, "scan did not finish");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn broken_entries_are_skipped() {
        let vfs = MemoryVfs::new()
            .with_file("tilesets/cave.tileset", header("cave", "Cave"))
            .with_file("tilesets/notes.txt", "not a tileset")
            .with_file("tilesets/lab.tileset", header("lab", "Laboratory"))
            .with_file("tilesets/empty.tileset", "")
            .with_file("tilesets/nameless.tileset", r#"{"display_name":"?"}"#);
        let catalog = scan_catalog(&vfs, &JsonHeaderCodec, "tilesets");
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["cave", "lab"]);
        assert_eq!(catalog["lab"].location, "tilesets/lab.tileset");
        assert_eq!(catalog["lab"].display_name(), "Laboratory");
    }

    #[test]
    fn last_duplicate_in_sorted_order_wins() {
        // Listed out of order on purpose; the scan sorts by file name.
        let vfs = MemoryVfs::new()
            .with_file("t/c", header("a", "Second A"))
            .with_file("t/b", header("b", "B"))
            .with_file("t/a", header("a", "First A"));
        let catalog = scan_catalog(&vfs, &JsonHeaderCodec, "t");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["a"].display_name(), "Second A");
        assert_eq!(catalog["a"].location, "t/c");
    }

    #[test]
    fn unlistable_directory_gives_empty_catalog() {
        let catalog = scan_catalog(&MemoryVfs::new(), &JsonHeaderCodec, "tilesets");
        assert!(catalog.is_empty());
    }

    #[test]
    fn callback_runs_once_on_the_polling_thread() {
        let vfs = MemoryVfs::new()
            .with_file("t/one", header("one", "One"))
            .with_file("t/bad", "{");
        let mut scanner = CatalogScanner::new(Arc::new(vfs), Arc::new(JsonHeaderCodec));
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(Catalog::new()));

        let (c, s) = (calls.clone(), seen.clone());
        scanner.scan("t", move |catalog| {
            c.set(c.get() + 1);
            *s.borrow_mut() = catalog;
        });
        assert!(scanner.is_pending());
        poll_until_done(&mut scanner);

        for _ in 0..10 {
            assert!(!scanner.poll());
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn superseded_scan_never_reports() {
        let vfs = MemoryVfs::new().with_file("t/one", header("one", "One"));
        let mut scanner = CatalogScanner::new(Arc::new(vfs), Arc::new(JsonHeaderCodec));
        let stale = Rc::new(Cell::new(false));
        let fresh = Rc::new(Cell::new(0));

        let s = stale.clone();
        scanner.scan("t", move |_| s.set(true));
        let f = fresh.clone();
        scanner.scan("t", move |_| f.set(f.get() + 1));
        assert_eq!(scanner.generation(), 2);

        poll_until_done(&mut scanner);
        // Give the first worker time to deliver too.
        std::thread::sleep(Duration::from_millis(20));
        scanner.poll();

        assert!(!stale.get());
        assert_eq!(fresh.get(), 1);
    }
}

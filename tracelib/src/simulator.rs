use log::{debug, warn};

use crate::cache::{Access, DirectMapped, FullyAssociative, SetAssociative, Store};
use crate::config::{CacheKind, RunConfig};
use crate::expr::EvalError;
use crate::geometry::{decompose, CacheGeometry};
use crate::row::Row;

/// Initial line capacity of the fill-columns stores. Rows indexing past it grow the store
/// instead of failing
const FILL_CAPACITY: usize = 256;

const ERROR: &str = "error";

/// Column labels are computed once per run; the bit widths are part of the label
struct Labels {
    tag: String,
    index: String,
    offset: String,
}

impl Labels {
    fn new(kind: CacheKind, geometry: &CacheGeometry) -> Self {
        let index = match kind {
            CacheKind::Direct => format!("index {}b", geometry.index_bits),
            _ => format!("set {}b", geometry.index_bits),
        };
        Self {
            tag: format!("tag {}b", geometry.tag_bits),
            index,
            offset: format!("offset {}b", geometry.offset_bits),
        }
    }
}

/// Simulates an ordered trace of address expressions against a single cache
///
/// The store is the only mutable state of a run and is rebuilt empty at the start of every
/// [`Simulator::simulate`] call, so repeated calls are independent and no warm state leaks
/// between runs
pub struct Simulator {
    kind: CacheKind,
    geometry: CacheGeometry,
    labels: Labels,
    store: Store,
}

impl Simulator {
    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: a run configuration, usually resulting from parsing JSON
    ///
    /// returns: Simulator
    pub fn new(config: &RunConfig) -> Self {
        let geometry = CacheGeometry::resolve(
            config.main_memory_mb,
            config.block_size,
            config.blocks,
            config.kind,
        );
        debug!("resolved {:?} geometry: {geometry:?}", config.kind);
        Self {
            kind: config.kind,
            labels: Labels::new(config.kind, &geometry),
            store: Store::with_capacity(config.kind, &geometry),
            geometry,
        }
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Number of unoccupied cache lines, for inspecting a finished run
    pub fn empty_line_count(&self) -> usize {
        self.store.empty_lines()
    }

    /// Runs the trace in input order, returning exactly one row per entry
    ///
    /// Each expression is evaluated with `eval`, decomposed against the run geometry, and
    /// driven through the occupancy store. An expression that fails to evaluate yields an
    /// error row (every computed column set to `"error"`) and leaves the store untouched,
    /// so a bad entry cannot perturb the outcomes of its neighbours
    ///
    /// # Arguments
    ///
    /// * `trace`: the address expressions, in access order
    /// * `eval`: the expression evaluator, e.g. [`crate::expr::evaluate`]
    ///
    /// returns: Vec<Row>
    pub fn simulate<E>(&mut self, trace: &[String], eval: E) -> Vec<Row>
    where
        E: Fn(&str) -> Result<u64, EvalError>,
    {
        self.store = Store::with_capacity(self.kind, &self.geometry);
        trace.iter().map(|expr| self.step(expr, &eval)).collect()
    }

    fn step<E>(&mut self, expr: &str, eval: &E) -> Row
    where
        E: Fn(&str) -> Result<u64, EvalError>,
    {
        let address = match eval(expr) {
            Ok(address) => address,
            Err(e) => {
                warn!("{e}");
                return self.error_row(expr);
            }
        };
        let parts = decompose(address, &self.geometry);

        let mut row = Row::new();
        row.set("address", expr);
        row.set(self.labels.tag.as_str(), parts.tag.to_string());
        match &mut self.store {
            Store::DirectMapped(lines) => {
                let access = lines.access(parts.index as usize, parts.tag);
                row.set(self.labels.index.as_str(), parts.index.to_string());
                row.set(self.labels.offset.as_str(), parts.offset.to_string());
                set_outcome(&mut row, access);
            }
            Store::FullyAssociative(lines) => {
                let access = lines.access(parts.tag);
                row.set("cache block", access.slot.to_string());
                row.set(self.labels.offset.as_str(), parts.offset.to_string());
                set_outcome(&mut row, access);
            }
            Store::SetAssociative(sets) => {
                let set = parts.index as usize;
                let access = sets.access(set, parts.tag);
                let resident = sets.resident(set);
                row.set(self.labels.index.as_str(), parts.index.to_string());
                row.set("tag of block 0", display_way(resident[0]));
                row.set("tag of block 1", display_way(resident[1]));
                row.set(self.labels.offset.as_str(), parts.offset.to_string());
                set_outcome(&mut row, access);
            }
        }
        row
    }

    // Occupancy columns are left out of error rows; only the decomposition and outcome
    // columns carry the error marker
    fn error_row(&self, expr: &str) -> Row {
        let mut row = Row::new();
        row.set("address", expr);
        row.set(self.labels.tag.as_str(), ERROR);
        if self.kind != CacheKind::Full {
            row.set(self.labels.index.as_str(), ERROR);
        }
        row.set(self.labels.offset.as_str(), ERROR);
        row.set("hit", ERROR);
        row.set("replace", ERROR);
        row
    }
}

fn set_outcome(row: &mut Row, access: Access) {
    row.set("hit", if access.hit { "hit" } else { "miss" });
    row.set("replace", if access.evicted { "yes" } else { "no" });
}

fn display_way(tag: Option<u64>) -> String {
    tag.map(|t| t.to_string()).unwrap_or_default()
}

fn field(row: &Row, label: &str) -> Option<u64> {
    row.get(label).and_then(|value| value.trim().parse().ok())
}

/// Completes pre-decomposed direct-mapped rows
///
/// Each input row must carry `tag` and `index` as numeric strings; all caller columns are
/// preserved and `hit/miss` and `replace` are appended (or overwritten in place if the
/// caller pre-populated them). A row whose fields do not parse gets `"error"` in the
/// appended columns and does not touch the store
pub fn fill_direct_mapped(rows: &[Row]) -> Vec<Row> {
    let mut lines = DirectMapped::new(FILL_CAPACITY);
    rows.iter()
        .map(|input| {
            let mut row = input.clone();
            match (field(input, "tag"), field(input, "index")) {
                (Some(tag), Some(index)) => {
                    let index = index as usize;
                    lines.grow(index);
                    set_fill_outcome(&mut row, lines.access(index, tag));
                }
                _ => {
                    row.set("hit/miss", ERROR);
                    row.set("replace", ERROR);
                }
            }
            row
        })
        .collect()
}

/// Completes pre-decomposed fully-associative rows
///
/// Requires `tag`; appends `cache-block-used`, `hit/miss`, and `replace`
pub fn fill_fully_associative(rows: &[Row]) -> Vec<Row> {
    let mut lines = FullyAssociative::new(FILL_CAPACITY);
    rows.iter()
        .map(|input| {
            let mut row = input.clone();
            match field(input, "tag") {
                Some(tag) => {
                    let access = lines.access(tag);
                    row.set("cache-block-used", access.slot.to_string());
                    set_fill_outcome(&mut row, access);
                }
                None => {
                    row.set("cache-block-used", ERROR);
                    row.set("hit/miss", ERROR);
                    row.set("replace", ERROR);
                }
            }
            row
        })
        .collect()
}

/// Completes pre-decomposed two-way set-associative rows
///
/// Requires `tag` and `set`; appends both resident way tags (empty string for an empty
/// way), `hit/miss`, and `replace`
pub fn fill_two_way(rows: &[Row]) -> Vec<Row> {
    let mut sets = SetAssociative::new(FILL_CAPACITY);
    rows.iter()
        .map(|input| {
            let mut row = input.clone();
            match (field(input, "tag"), field(input, "set")) {
                (Some(tag), Some(set)) => {
                    let set = set as usize;
                    sets.grow(set);
                    let access = sets.access(set, tag);
                    let resident = sets.resident(set);
                    row.set("tag-of-block-0", display_way(resident[0]));
                    row.set("tag-of-block-1", display_way(resident[1]));
                    set_fill_outcome(&mut row, access);
                }
                _ => {
                    row.set("tag-of-block-0", ERROR);
                    row.set("tag-of-block-1", ERROR);
                    row.set("hit/miss", ERROR);
                    row.set("replace", ERROR);
                }
            }
            row
        })
        .collect()
}

fn set_fill_outcome(row: &mut Row, access: Access) {
    row.set("hit/miss", if access.hit { "hit" } else { "miss" });
    row.set("replace", if access.evicted { "yes" } else { "no" });
}

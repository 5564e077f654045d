//! Self-contained symbol tables for one revision of a library.
//!
//! A [`Snapshot`] owns every top-level descriptor of one revision and the
//! ancestor closure of its class-likes, so type relationships always resolve
//! against the hierarchy of the revision a descriptor came from.
//!
//! # Format
//!
//! ```json
//! {
//!   "classes": [
//!     { "name": "Thing", "kind": "class", "extends": ["Base"],
//!       "methods": [ { "name": "run", "parameters": [ { "name": "x", "type": "int" } ] } ] }
//!   ],
//!   "functions": [ { "name": "helper", "return_type": "?string" } ]
//! }
//! ```

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{AnalysisError, Result, SnapshotError};
use crate::types::{ClassLike, FunctionLike};

/// Class-like every iterable class type descends from.
pub const ITERABLE_ROOT: &str = "Traversable";

/// Serialized form of a snapshot, as written by a snapshot provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    #[serde(default)]
    pub classes: Vec<ClassLike>,
    #[serde(default)]
    pub functions: Vec<FunctionLike>,
}

/// The complete symbol table of one revision.
#[derive(Debug)]
pub struct Snapshot {
    label: String,
    classes: Vec<ClassLike>,
    class_index: HashMap<String, usize>,
    functions: Vec<FunctionLike>,
    function_index: HashMap<String, usize>,
}

impl Snapshot {
    /// Build a snapshot, computing ancestor sets and back-references.
    ///
    /// # Errors
    ///
    /// - `DuplicateSymbol`: two class-likes or two functions share a name
    /// - `InheritanceCycle`: a class-like is (transitively) its own ancestor
    pub fn new(label: impl Into<String>, table: SymbolTable) -> Result<Self> {
        let SymbolTable {
            mut classes,
            mut functions,
        } = table;

        let class_index = index_by_name(&classes, |c| &c.name, "class-like")?;
        let function_index = index_by_name(&functions, |f| &f.name, "function")?;

        let ancestors = ancestor_closure(&classes)?;
        for (class, ancestors) in classes.iter_mut().zip(ancestors) {
            class.ancestors = ancestors;
            attach_members(class);
        }
        for function in &mut functions {
            number_parameters(function);
        }

        Ok(Self {
            label: label.into(),
            classes,
            class_index,
            functions,
            function_index,
        })
    }

    /// Parse a JSON symbol table.
    pub fn from_json_str(label: impl Into<String>, json: &str) -> Result<Self> {
        let table: SymbolTable = serde_json::from_str(json)?;
        Self::new(label, table)
    }

    /// Read a JSON symbol table from disk; the path becomes the label.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let snapshot = Self::from_json_str(path.display().to_string(), &content)?;
        tracing::debug!(
            snapshot = %snapshot.label,
            classes = snapshot.classes.len(),
            functions = snapshot.functions.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn class(&self, name: &str) -> Option<&ClassLike> {
        self.class_index.get(name).map(|&i| &self.classes[i])
    }

    pub fn function(&self, name: &str) -> Option<&FunctionLike> {
        self.function_index.get(name).map(|&i| &self.functions[i])
    }

    /// Class-likes in declaration order.
    pub fn classes(&self) -> &[ClassLike] {
        &self.classes
    }

    /// Free functions in declaration order.
    pub fn functions(&self) -> &[FunctionLike] {
        &self.functions
    }

    /// Every top-level qualified name, class-likes first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.functions.iter().map(|f| f.name.as_str()))
    }

    /// Look up a class-like a type refers to.
    ///
    /// # Errors
    ///
    /// `UnknownClass` when the name is not declared in this snapshot.
    pub fn resolve_class(&self, name: &str) -> std::result::Result<&ClassLike, AnalysisError> {
        self.class(name).ok_or_else(|| AnalysisError::UnknownClass {
            name: name.to_string(),
            snapshot: self.label.clone(),
        })
    }
}

fn index_by_name<T>(
    items: &[T],
    name: impl Fn(&T) -> &String,
    kind: &'static str,
) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if index.insert(name(item).clone(), i).is_some() {
            return Err(SnapshotError::DuplicateSymbol {
                kind,
                name: name(item).clone(),
            });
        }
    }
    Ok(index)
}

/// Compute the transitive ancestors of every class-like, in input order.
///
/// Ancestors that are not declared in the table stay in the set as names;
/// the walk simply stops there.
fn ancestor_closure(classes: &[ClassLike]) -> Result<Vec<BTreeSet<String>>> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::with_capacity(classes.len());

    for class in classes {
        nodes.insert(class.name.as_str(), graph.add_node(class.name.clone()));
    }
    for class in classes {
        let child = nodes[class.name.as_str()];
        for parent in class.extends.iter().chain(&class.implements) {
            let parent_idx = match nodes.get(parent.as_str()) {
                Some(&idx) => idx,
                None => {
                    let idx = graph.add_node(parent.clone());
                    nodes.insert(parent.as_str(), idx);
                    idx
                }
            };
            graph.add_edge(child, parent_idx, ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        return Err(SnapshotError::InheritanceCycle {
            name: graph[cycle.node_id()].clone(),
        });
    }

    Ok(classes
        .iter()
        .map(|class| {
            let start = nodes[class.name.as_str()];
            let mut dfs = Dfs::new(&graph, start);
            let mut ancestors = BTreeSet::new();
            while let Some(idx) = dfs.next(&graph) {
                if idx != start {
                    ancestors.insert(graph[idx].clone());
                }
            }
            ancestors
        })
        .collect())
}

fn attach_members(class: &mut ClassLike) {
    let owner = class.name.clone();
    for constant in &mut class.constants {
        constant.declaring_class = owner.clone();
    }
    for property in &mut class.properties {
        property.declaring_class = owner.clone();
    }
    for method in &mut class.methods {
        method.declaring_class = Some(owner.clone());
        number_parameters(method);
    }
}

fn number_parameters(function: &mut FunctionLike) {
    for (position, parameter) in function.parameters.iter_mut().enumerate() {
        parameter.position = position;
    }
}

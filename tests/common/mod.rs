//! Shared in-memory mock repository for integration tests.
//!
//! Sessions produced by [`TreeFactory`] operate on one shared node tree, so
//! changes made through one session are visible to the next. Queries are
//! canned: statements registered with [`TreeRepository::stub_query`] return
//! their paths, statements registered with
//! [`TreeRepository::fail_statement`] fail, everything else matches nothing.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use noderepo::{
    ItemData, NodeData, Property, QueryOutcome, RepositoryError, Session, SessionFactory,
    SessionResult, Value,
};

pub struct TreeRepository {
    root: RwLock<NodeData>,
    queries: Mutex<HashMap<String, Vec<String>>>,
    failing: Mutex<HashSet<String>>,
}

impl TreeRepository {
    pub fn new(root: NodeData) -> Arc<Self> {
        Arc::new(Self {
            root: RwLock::new(root),
            queries: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        })
    }

    /// A small content tree used by most tests:
    ///
    /// ```text
    /// /
    /// /content
    /// /content/articles        title=Hello, tags=[a,b]
    /// /content/articles/first  author=alice
    /// /media
    /// ```
    pub fn sample() -> Arc<Self> {
        let mut root = NodeData::new("/");

        let mut content = NodeData::new("/content");
        let mut articles = NodeData::new("/content/articles");
        articles.push_property(Property::single("/content/articles/title", "Hello"));
        articles.push_property(Property::multiple(
            "/content/articles/tags",
            vec![Value::from("a"), Value::from("b")],
        ));

        let mut first = NodeData::new("/content/articles/first");
        first.push_property(Property::single("/content/articles/first/author", "alice"));
        articles.push_child(first);
        content.push_child(articles);

        root.push_child(content);
        root.push_child(NodeData::new("/media"));

        Self::new(root)
    }

    pub fn stub_query(&self, statement: &str, paths: Vec<&str>) {
        self.queries.lock().unwrap().insert(
            statement.to_string(),
            paths.into_iter().map(String::from).collect(),
        );
    }

    pub fn fail_statement(&self, statement: &str) {
        self.failing.lock().unwrap().insert(statement.to_string());
    }

    pub fn node(&self, path: &str) -> Option<NodeData> {
        self.root.read().unwrap().find(path).cloned()
    }
}

pub struct TreeSession {
    repo: Arc<TreeRepository>,
    live: AtomicBool,
    logouts: AtomicUsize,
    saves: AtomicUsize,
    pending: AtomicBool,
    lock_tokens: Mutex<Vec<String>>,
    imported: Mutex<Vec<(String, Vec<u8>)>>,
    attributes: HashMap<String, Value>,
}

impl TreeSession {
    fn new(repo: Arc<TreeRepository>) -> Arc<Self> {
        let mut attributes = HashMap::new();
        attributes.insert("user".to_string(), Value::from("alice"));
        Arc::new(Self {
            repo,
            live: AtomicBool::new(true),
            logouts: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            pending: AtomicBool::new(false),
            lock_tokens: Mutex::new(Vec::new()),
            imported: Mutex::new(Vec::new()),
            attributes,
        })
    }

    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn imported(&self) -> Vec<(String, Vec<u8>)> {
        self.imported.lock().unwrap().clone()
    }
}

/// Detach the node at `path` from wherever it hangs in the tree.
fn detach(node: &mut NodeData, path: &str) -> Option<NodeData> {
    if let Some(pos) = node.children.iter().position(|c| c.path == path) {
        return Some(node.children.remove(pos));
    }
    node.children.iter_mut().find_map(|c| detach(c, path))
}

fn find_mut<'a>(node: &'a mut NodeData, path: &str) -> Option<&'a mut NodeData> {
    if node.path == path {
        return Some(node);
    }
    node.children.iter_mut().find_map(|c| find_mut(c, path))
}

/// Rewrite the subtree's paths after a move.
fn rebase(node: &mut NodeData, old_prefix: &str, new_prefix: &str) {
    let rewrite = |path: &str| format!("{new_prefix}{}", &path[old_prefix.len()..]);
    node.path = rewrite(&node.path);
    for property in &mut node.properties {
        property.path = rewrite(&property.path);
    }
    for child in &mut node.children {
        rebase(child, old_prefix, new_prefix);
    }
}

fn parent_path(path: &str) -> Option<&str> {
    let (parent, name) = path.rsplit_once('/')?;
    if name.is_empty() {
        return None;
    }
    Some(if parent.is_empty() { "/" } else { parent })
}

impl Session for TreeSession {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.attributes.keys().cloned().collect();
        names.sort();
        names
    }

    fn add_lock_token(&self, token: &str) {
        self.lock_tokens.lock().unwrap().push(token.to_string());
    }

    fn remove_lock_token(&self, token: &str) {
        self.lock_tokens.lock().unwrap().retain(|t| t != token);
    }

    fn lock_tokens(&self) -> Vec<String> {
        self.lock_tokens.lock().unwrap().clone()
    }

    fn move_item(&self, src_path: &str, dest_path: &str) -> SessionResult<()> {
        let mut root = self.repo.root.write().unwrap();
        let mut moved = detach(&mut root, src_path)
            .ok_or_else(|| RepositoryError::PathNotFound(src_path.to_string()))?;
        rebase(&mut moved, src_path, dest_path);

        let parent = parent_path(dest_path)
            .ok_or_else(|| RepositoryError::PathNotFound(dest_path.to_string()))?;
        let parent_node = find_mut(&mut root, parent)
            .ok_or_else(|| RepositoryError::PathNotFound(parent.to_string()))?;
        parent_node.children.push(moved);

        self.pending.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn save(&self) -> SessionResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.pending.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn refresh(&self, keep_changes: bool) -> SessionResult<()> {
        if !keep_changes {
            self.pending.store(false, Ordering::SeqCst);
        }
        Ok(())
    }

    fn has_pending_changes(&self) -> SessionResult<bool> {
        Ok(self.pending.load(Ordering::SeqCst))
    }

    fn root_node(&self) -> SessionResult<NodeData> {
        Ok(self.repo.root.read().unwrap().clone())
    }

    fn item(&self, path: &str) -> SessionResult<ItemData> {
        let root = self.repo.root.read().unwrap();
        if let Some(node) = root.find(path) {
            return Ok(ItemData::Node(node.clone()));
        }
        // Not a node: look for a property with this path.
        let mut stack = vec![&*root];
        while let Some(node) = stack.pop() {
            if let Some(property) = node.properties.iter().find(|p| p.path == path) {
                return Ok(ItemData::Property(property.clone()));
            }
            stack.extend(node.children.iter());
        }
        Err(RepositoryError::PathNotFound(path.to_string()))
    }

    fn item_exists(&self, path: &str) -> SessionResult<bool> {
        match self.item(path) {
            Ok(_) => Ok(true),
            Err(RepositoryError::PathNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn node_by_id(&self, id: &Uuid) -> SessionResult<NodeData> {
        let root = self.repo.root.read().unwrap();
        let mut stack = vec![&*root];
        while let Some(node) = stack.pop() {
            if node.id == *id {
                return Ok(node.clone());
            }
            stack.extend(node.children.iter());
        }
        Err(RepositoryError::NodeNotFound(*id))
    }

    fn run_query(&self, statement: &str, language: &str) -> SessionResult<QueryOutcome> {
        if self.repo.failing.lock().unwrap().contains(statement) {
            return Err(RepositoryError::InvalidQuery(statement.to_string()));
        }
        let paths = self
            .repo
            .queries
            .lock()
            .unwrap()
            .get(statement)
            .cloned()
            .unwrap_or_default();
        Ok(QueryOutcome::new(statement, language, paths))
    }

    fn import_content(&self, parent_path: &str, input: &mut dyn Read) -> SessionResult<()> {
        let mut buf = Vec::new();
        input.read_to_end(&mut buf)?;
        self.imported
            .lock()
            .unwrap()
            .push((parent_path.to_string(), buf));
        self.pending.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
    }
}

pub struct TreeFactory {
    repo: Arc<TreeRepository>,
    created: Mutex<Vec<Arc<TreeSession>>>,
}

impl TreeFactory {
    pub fn new(repo: Arc<TreeRepository>) -> Arc<Self> {
        Arc::new(Self {
            repo,
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn sample() -> Arc<Self> {
        Self::new(TreeRepository::sample())
    }

    pub fn repo(&self) -> &Arc<TreeRepository> {
        &self.repo
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn session_at(&self, idx: usize) -> Arc<TreeSession> {
        Arc::clone(&self.created.lock().unwrap()[idx])
    }
}

impl SessionFactory for TreeFactory {
    fn session(&self) -> SessionResult<Arc<dyn Session>> {
        let session = TreeSession::new(Arc::clone(&self.repo));
        self.created.lock().unwrap().push(Arc::clone(&session));
        Ok(session)
    }
}

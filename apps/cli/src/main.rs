use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use once_cell::sync::Lazy;
use regex::Regex;

use mdpad_assets::rewrite_image_references;
use mdpad_core::{DraftStore, EditorWorkspace, FsDraftStore, LinkTarget, WorkspaceConfig};
use mdpad_project::tree::TreeNode;
use mdpad_vfs::FsDirectoryHandle;

#[derive(Parser)]
#[command(
    name = "mdpad-cli",
    about = "Inspection commands for mdpad workspaces",
    author,
    version
)]
struct Cli {
    /// 工作區根目錄；預設為目前目錄。 / Workspace root (defaults to the current directory).
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<PathBuf>,

    /// 草稿儲存目錄；預設為根目錄下的 .mdpad/drafts。 / Draft store directory; defaults to .mdpad/drafts under the root.
    #[arg(long, global = true, value_name = "PATH")]
    drafts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出工作區的文件樹。 / Print the workspace document tree.
    Tree(TreeArgs),
    /// 顯示單一文件內容(含草稿對帳)。 / Show one document's content (draft reconciliation included).
    Show(ShowArgs),
    /// 解析文件中的連結。 / Resolve the links found in a document.
    Links(LinksArgs),
    /// 管理崩潰還原草稿。 / Manage crash-recovery drafts.
    #[command(subcommand)]
    Drafts(DraftsCommand),
}

#[derive(Args)]
struct TreeArgs {
    /// 以 JSON 輸出而非縮排文字。 / Emit JSON instead of indented text.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ShowArgs {
    /// 樹內文件路徑(例如 docs/guide.md)。 / Tree document path (e.g. docs/guide.md).
    path: String,

    /// 將相對圖片參照改寫為已解析的 data URI。 / Rewrite relative image references into resolved data URIs.
    #[arg(long)]
    resolve_assets: bool,
}

#[derive(Args)]
struct LinksArgs {
    /// 樹內文件路徑。 / Tree document path.
    path: String,
}

#[derive(Subcommand)]
enum DraftsCommand {
    /// 列出現存的草稿鍵值。 / List the draft keys currently held.
    List,
    /// 移除所有草稿。 / Remove every draft.
    Clear,
}

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^!])\[[^\]]*\]\((?P<ref>[^)\s]+)[^)]*\)").expect("link pattern"));

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let drafts_dir = cli
        .drafts_dir
        .clone()
        .unwrap_or_else(|| root.join(".mdpad").join("drafts"));

    match cli.command {
        Commands::Tree(args) => run_tree(&root, &drafts_dir, &args),
        Commands::Show(args) => run_show(&root, &drafts_dir, &args),
        Commands::Links(args) => run_links(&root, &drafts_dir, &args),
        Commands::Drafts(command) => run_drafts(&drafts_dir, &command),
    }
}

fn open_workspace(root: &Path, drafts_dir: &Path) -> Result<EditorWorkspace> {
    let mut workspace = EditorWorkspace::new(
        WorkspaceConfig::default(),
        Box::new(FsDraftStore::new(drafts_dir)),
    );
    let handle = FsDirectoryHandle::open(root)
        .with_context(|| format!("opening workspace root {}", root.display()))?;
    workspace.open_root(handle).context("scanning workspace root")?;
    Ok(workspace)
}

fn run_tree(root: &Path, drafts_dir: &Path, args: &TreeArgs) -> Result<()> {
    let workspace = open_workspace(root, drafts_dir)?;
    if args.json {
        let value = serde_json::Value::Array(tree_json(workspace.tree()));
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_tree(workspace.tree(), 0);
    }
    Ok(())
}

fn print_tree(nodes: &[TreeNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            TreeNode::Folder { name, children, .. } => {
                println!("{indent}{name}/");
                print_tree(children, depth + 1);
            }
            TreeNode::File(record) => println!("{indent}{}", record.name),
        }
    }
}

fn tree_json(nodes: &[TreeNode]) -> Vec<serde_json::Value> {
    nodes
        .iter()
        .map(|node| match node {
            TreeNode::Folder {
                name,
                path,
                children,
            } => serde_json::json!({
                "kind": "folder",
                "name": name,
                "path": path,
                "children": tree_json(children),
            }),
            TreeNode::File(record) => serde_json::json!({
                "kind": "file",
                "name": record.name,
                "path": record.path,
            }),
        })
        .collect()
}

fn run_show(root: &Path, drafts_dir: &Path, args: &ShowArgs) -> Result<()> {
    let mut workspace = open_workspace(root, drafts_dir)?;
    let text = workspace
        .open_path(&args.path)
        .with_context(|| format!("opening {}", args.path))?
        .to_string();

    if workspace.is_dirty(&args.path) {
        eprintln!("note: showing unsaved draft content for {}", args.path);
    }

    if args.resolve_assets {
        let rewritten =
            rewrite_image_references(&text, |raw| workspace.image_source(raw, &args.path));
        print!("{rewritten}");
    } else {
        print!("{text}");
    }
    Ok(())
}

fn run_links(root: &Path, drafts_dir: &Path, args: &LinksArgs) -> Result<()> {
    let mut workspace = open_workspace(root, drafts_dir)?;
    let text = workspace
        .open_path(&args.path)
        .with_context(|| format!("opening {}", args.path))?
        .to_string();

    for captures in LINK_RE.captures_iter(&text) {
        let raw = &captures["ref"];
        match workspace.follow_link(raw, &args.path) {
            LinkTarget::Document(target) => println!("{raw} -> document {target}"),
            LinkTarget::External(target) => println!("{raw} -> external {target}"),
            LinkTarget::Unresolved => println!("{raw} -> unresolved"),
        }
    }
    Ok(())
}

fn run_drafts(drafts_dir: &Path, command: &DraftsCommand) -> Result<()> {
    let mut store = FsDraftStore::new(drafts_dir);
    match command {
        DraftsCommand::List => {
            for key in store.keys() {
                println!("{key}");
            }
        }
        DraftsCommand::Clear => {
            let keys = store.keys();
            let count = keys.len();
            for key in keys {
                store
                    .remove(&key)
                    .with_context(|| format!("removing draft {key}"))?;
            }
            println!("removed {count} draft(s)");
        }
    }
    Ok(())
}

//! st node - Author skill nodes in a scope

use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_data, HumanLayout};
use crate::core::{
    effects::node_contribution, missing_prerequisites, EffectKind, NodeUpdate, ScopeState,
    SkillNode,
};
use crate::error::{GraphError, Result, StError};

#[derive(Args, Debug)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommand,
}

#[derive(Subcommand, Debug)]
pub enum NodeCommand {
    /// Add a node to the scope
    Add(NodeAddArgs),
    /// Change fields of an existing node
    Update(NodeUpdateArgs),
    /// Remove a node and its edges, returning its points to the budget
    Remove {
        /// Node id
        id: String,
    },
    /// Show one node with its prerequisites and current value
    Show {
        /// Node id
        id: String,
    },
    /// List every node in the scope
    List,
}

#[derive(Args, Debug)]
pub struct NodeAddArgs {
    /// Unique node id within the scope
    pub id: String,

    /// Display title
    pub title: String,

    /// Effect kind, e.g. `xp_multiplier` or `difficulty_xp_bonus:hard`
    #[arg(long, short)]
    pub effect: EffectKind,

    /// Value granted by the first point
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub base: f64,

    /// Value added by each point after the first
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub scaling: f64,

    /// Maximum points the node accepts
    #[arg(long, default_value_t = 1)]
    pub max: u32,

    #[arg(long, short)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct NodeUpdateArgs {
    /// Node id
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short)]
    pub description: Option<String>,

    #[arg(long, short)]
    pub effect: Option<EffectKind>,

    #[arg(long, allow_negative_numbers = true)]
    pub base: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub scaling: Option<f64>,

    /// New cap; rejected if below the points already invested
    #[arg(long)]
    pub max: Option<u32>,
}

impl NodeUpdateArgs {
    fn to_update(&self) -> NodeUpdate {
        NodeUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            effect_kind: self.effect.clone(),
            base_value: self.base,
            scaling_per_point: self.scaling,
            max_investment: self.max,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PrerequisiteView {
    pub parent_id: String,
    pub required: u32,
    pub current: u32,
    pub met: bool,
}

#[derive(Debug, Serialize)]
pub struct NodeView {
    pub node: SkillNode,
    pub points: u32,
    pub available: bool,
    /// Contribution to the aggregated effect, absent while uninvested.
    pub value: Option<f64>,
    pub prerequisites: Vec<PrerequisiteView>,
    pub children: Vec<String>,
}

impl NodeView {
    fn build(state: &ScopeState, id: &str) -> Result<Self> {
        let node = state
            .graph
            .get_node(id)
            .ok_or_else(|| StError::Graph(GraphError::NodeNotFound(id.to_string())))?;
        let missing = missing_prerequisites(&state.graph, &state.ledger, id);
        let prerequisites = state
            .graph
            .parents_of(id)
            .into_iter()
            .map(|(parent_id, required)| PrerequisiteView {
                parent_id: parent_id.to_string(),
                required,
                current: state.ledger.points(parent_id),
                met: !missing.iter().any(|m| m.parent_id == parent_id),
            })
            .collect();

        Ok(Self {
            node: node.clone(),
            points: state.ledger.points(id),
            available: missing.is_empty(),
            value: node_contribution(node, &state.ledger),
            prerequisites,
            children: state
                .graph
                .children_of(id)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NodeListEntry {
    pub id: String,
    pub title: String,
    pub effect_kind: EffectKind,
    pub points: u32,
    pub max_investment: u32,
}

#[derive(Debug, Serialize)]
pub struct NodeRemoved {
    pub id: String,
    pub refunded: u32,
    pub budget: u32,
}

pub fn run(ctx: &AppContext, args: &NodeArgs) -> Result<()> {
    match &args.command {
        NodeCommand::Add(add) => run_add(ctx, add),
        NodeCommand::Update(update) => run_update(ctx, update),
        NodeCommand::Remove { id } => run_remove(ctx, id),
        NodeCommand::Show { id } => run_show(ctx, id),
        NodeCommand::List => run_list(ctx),
    }
}

fn run_add(ctx: &AppContext, args: &NodeAddArgs) -> Result<()> {
    let mut node = SkillNode::new(&args.id, &args.title, args.effect.clone())
        .with_values(args.base, args.scaling)
        .with_max_investment(args.max)
        .with_scope(ctx.scope.clone());
    if let Some(description) = &args.description {
        node = node.with_description(description);
    }

    let state = ctx
        .session()
        .author(&ctx.scope, "node add", |state| state.add_node(node))?;
    show_view(ctx, &NodeView::build(&state, &args.id)?)
}

fn run_update(ctx: &AppContext, args: &NodeUpdateArgs) -> Result<()> {
    let update = args.to_update();
    if update.is_empty() {
        return Err(StError::ValidationFailed(
            "node update needs at least one field to change".to_string(),
        ));
    }
    let state = ctx.session().author(&ctx.scope, "node update", |state| {
        state.update_node(&args.id, &update)
    })?;
    show_view(ctx, &NodeView::build(&state, &args.id)?)
}

fn run_remove(ctx: &AppContext, id: &str) -> Result<()> {
    let session = ctx.session();
    let refunded = session.load(&ctx.scope)?.ledger.points(id);
    let state = session.author(&ctx.scope, "node remove", |state| state.delete_node(id))?;

    let removed = NodeRemoved {
        id: id.to_string(),
        refunded,
        budget: state.budget,
    };
    emit_data(ctx.output_format, &removed, |removed| {
        let mut layout = HumanLayout::new();
        layout
            .title(&format!("{} Removed {}", style("✓").green(), removed.id))
            .kv("refunded", &removed.refunded.to_string())
            .kv("budget", &removed.budget.to_string());
        layout
    })
}

fn run_show(ctx: &AppContext, id: &str) -> Result<()> {
    let state = ctx.session().load(&ctx.scope)?;
    show_view(ctx, &NodeView::build(&state, id)?)
}

fn run_list(ctx: &AppContext) -> Result<()> {
    let state = ctx.session().load(&ctx.scope)?;
    let entries: Vec<NodeListEntry> = state
        .graph
        .topological_order()
        .into_iter()
        .filter_map(|id| state.graph.get_node(id))
        .map(|node| NodeListEntry {
            id: node.id.clone(),
            title: node.title.clone(),
            effect_kind: node.effect_kind.clone(),
            points: state.ledger.points(&node.id),
            max_investment: node.max_investment,
        })
        .collect();

    emit_data(ctx.output_format, &entries, |entries| {
        let mut layout = HumanLayout::new();
        layout.title(&format!("Nodes in {}", ctx.scope));
        if entries.is_empty() {
            layout.push_line(style("No nodes yet. Add one with `st node add`.").dim().to_string());
        }
        for entry in entries {
            layout.bullet(&format!(
                "{} {} [{}] {}/{}",
                style(&entry.id).cyan(),
                entry.title,
                entry.effect_kind,
                entry.points,
                entry.max_investment
            ));
        }
        layout
    })
}

fn show_view(ctx: &AppContext, view: &NodeView) -> Result<()> {
    emit_data(ctx.output_format, view, |view| {
        let node = &view.node;
        let mut layout = HumanLayout::new();
        layout
            .title(&format!("{} ({})", node.title, style(&node.id).cyan()))
            .kv("effect", &node.effect_kind.to_string())
            .kv(
                "investment",
                &format!("{}/{}", view.points, node.max_investment),
            )
            .kv("base / scaling", &format!("{} / {}", node.base_value, node.scaling_per_point))
            .kv(
                "value",
                &view
                    .value
                    .map_or_else(|| "-".to_string(), |value| value.to_string()),
            )
            .kv(
                "available",
                &if view.available {
                    style("yes").green().to_string()
                } else {
                    style("no").red().to_string()
                },
            );
        if !node.description.is_empty() {
            layout.kv("description", &node.description);
        }
        if !view.prerequisites.is_empty() {
            layout.blank().section("Prerequisites");
            for prereq in &view.prerequisites {
                let mark = if prereq.met {
                    style("✓").green()
                } else {
                    style("✗").red()
                };
                layout.bullet(&format!(
                    "{mark} {} {}/{}",
                    prereq.parent_id, prereq.current, prereq.required
                ));
            }
        }
        if !view.children.is_empty() {
            layout.blank().section("Unlocks");
            for child in &view.children {
                layout.bullet(child);
            }
        }
        layout
    })
}

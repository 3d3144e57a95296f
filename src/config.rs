// config.rs - Per-scene configuration
//
// Defaults reproduce the shipped look. Hosts may pass partial overrides at
// activation; missing fields fall back to the defaults. Every config is
// validated before its scene is built.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, check_positive, check_range};
use crate::scene::{FILE_ROWS, PALETTE, PIPELINE_EDGES, PIPELINE_STAGES};
use crate::sim::{MAX_AGENTS, MAX_TOKENS, SceneKind};
use crate::world::Rgb;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub agents: usize,
    /// Agents closer than this are linked.
    pub link_distance: f32,
    /// Opacity of a link between coincident agents.
    pub link_alpha: f32,
    /// Inset from every surface edge that agents bounce off.
    pub margin: f32,
    pub max_speed: f32,
    /// Largest random velocity change per tick, per axis.
    pub jitter: f32,
    pub radius: (f32, f32),
    /// Fraction of agents drawn as active.
    pub active_ratio: f32,
    pub token_cap: usize,
    pub spawn_ms: u32,
    pub token_speed: (f32, f32),
    pub palette: Vec<Rgb>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            agents: 30,
            link_distance: 120.0,
            link_alpha: 0.15,
            margin: 20.0,
            max_speed: 0.3,
            jitter: 0.01,
            radius: (3.0, 7.0),
            active_ratio: 0.7,
            token_cap: 8,
            spawn_ms: 400,
            token_speed: (0.005, 0.015),
            palette: PALETTE.to_vec(),
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agents > MAX_AGENTS {
            return Err(ConfigError::TooMany { what: "agents", count: self.agents, max: MAX_AGENTS });
        }
        check_cap(self.token_cap)?;
        check_positive("link_distance", self.link_distance)?;
        check_range("margin", (0.0, self.margin))?;
        check_range("link_alpha", (0.0, self.link_alpha))?;
        check_range("max_speed", (0.0, self.max_speed))?;
        check_range("jitter", (0.0, self.jitter))?;
        check_range("radius", self.radius)?;
        check_unit("active_ratio", self.active_ratio)?;
        check_positive("spawn_ms", self.spawn_ms as f32)?;
        check_speed(self.token_speed)?;
        non_empty("palette", &self.palette)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: usize,
    pub rows: usize,
    pub active_ratio: f32,
    /// Progress added to every active cell per tick.
    pub progress_step: f32,
    /// A cell whose progress passes 1 restarts somewhere in this range.
    pub restart: (f32, f32),
    pub initial_progress: (f32, f32),
    pub padding: f32,
    pub link_alpha: f32,
    pub palette: Vec<Rgb>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: 10,
            rows: 5,
            active_ratio: 0.9,
            progress_step: 0.001,
            restart: (0.1, 0.3),
            initial_progress: (0.2, 1.0),
            padding: 30.0,
            link_alpha: 0.1,
            palette: PALETTE.to_vec(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::Empty("grid"));
        }
        check_unit("active_ratio", self.active_ratio)?;
        check_range("progress_step", (0.0, self.progress_step))?;
        check_unit_range("restart", self.restart)?;
        check_unit_range("initial_progress", self.initial_progress)?;
        check_range("padding", (0.0, self.padding))?;
        check_unit("link_alpha", self.link_alpha)?;
        non_empty("palette", &self.palette)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Dir,
    Modified,
    Added,
    File,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowSpec {
    pub name: String,
    pub depth: u8,
    pub kind: RowKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTreeConfig {
    pub rows: Vec<RowSpec>,
    /// Period of the reveal timer.
    pub reveal_ms: u32,
    /// Opacity gained per tick by a revealed row.
    pub ease_step: f32,
    pub row_height: f32,
    pub indent: f32,
    pub top: f32,
}

impl Default for FileTreeConfig {
    fn default() -> Self {
        Self {
            rows: FILE_ROWS
                .iter()
                .map(|&(name, depth, kind)| RowSpec { name: name.into(), depth, kind })
                .collect(),
            reveal_ms: 600,
            ease_step: 0.05,
            row_height: 21.0,
            indent: 18.0,
            top: 8.0,
        }
    }
}

impl FileTreeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("rows", &self.rows)?;
        check_positive("reveal_ms", self.reveal_ms as f32)?;
        check_positive("ease_step", self.ease_step)?;
        check_positive("row_height", self.row_height)?;
        check_range("indent", (0.0, self.indent))?;
        check_range("top", (0.0, self.top))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Waiting,
    Running,
    Done,
}

impl Status {
    /// Next status in the script. Done is terminal.
    pub fn advance(self) -> Status {
        match self {
            Status::Waiting => Status::Running,
            Status::Running | Status::Done => Status::Done,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub color: Rgb,
    #[serde(default)]
    pub status: Status,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub stages: Vec<StageSpec>,
    pub edges: Vec<EdgeSpec>,
    pub token_cap: usize,
    pub spawn_ms: u32,
    pub token_speed: (f32, f32),
    pub node_radius: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: PIPELINE_STAGES
                .iter()
                .map(|&(id, label, x, y, color, status)| StageSpec {
                    id: id.into(),
                    label: label.into(),
                    x,
                    y,
                    color,
                    status,
                })
                .collect(),
            edges: PIPELINE_EDGES
                .iter()
                .map(|&(from, to)| EdgeSpec { from: from.into(), to: to.into() })
                .collect(),
            token_cap: 4,
            spawn_ms: 500,
            token_speed: (0.008, 0.018),
            node_radius: 28.0,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("stages", &self.stages)?;

        let mut seen = HashSet::new();
        for s in &self.stages {
            if !seen.insert(s.id.as_str()) {
                return Err(ConfigError::DuplicateNode(s.id.clone()));
            }
            let inside = (0.0..=1.0).contains(&s.x) && (0.0..=1.0).contains(&s.y);
            if !inside {
                return Err(ConfigError::NodeOutOfRange { id: s.id.clone(), x: s.x, y: s.y });
            }
        }

        for (edge, e) in self.edges.iter().enumerate() {
            for id in [&e.from, &e.to] {
                if !seen.contains(id.as_str()) {
                    return Err(ConfigError::UnknownNode { edge, id: id.clone() });
                }
            }
        }

        check_cap(self.token_cap)?;
        check_positive("spawn_ms", self.spawn_ms as f32)?;
        check_speed(self.token_speed)?;
        check_positive("node_radius", self.node_radius)
    }
}

/// Configuration for one scene, tagged by the scene it builds.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneConfig {
    Network(NetworkConfig),
    FileTree(FileTreeConfig),
    Pipeline(PipelineConfig),
    Grid(GridConfig),
}

impl SceneConfig {
    pub fn default_for(kind: SceneKind) -> Self {
        match kind {
            SceneKind::Network => SceneConfig::Network(NetworkConfig::default()),
            SceneKind::FileTree => SceneConfig::FileTree(FileTreeConfig::default()),
            SceneKind::Pipeline => SceneConfig::Pipeline(PipelineConfig::default()),
            SceneKind::Grid => SceneConfig::Grid(GridConfig::default()),
        }
    }

    pub fn kind(&self) -> SceneKind {
        match self {
            SceneConfig::Network(_) => SceneKind::Network,
            SceneConfig::FileTree(_) => SceneKind::FileTree,
            SceneConfig::Pipeline(_) => SceneKind::Pipeline,
            SceneConfig::Grid(_) => SceneKind::Grid,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SceneConfig::Network(c) => c.validate(),
            SceneConfig::FileTree(c) => c.validate(),
            SceneConfig::Pipeline(c) => c.validate(),
            SceneConfig::Grid(c) => c.validate(),
        }
    }
}

fn check_cap(cap: usize) -> Result<(), ConfigError> {
    if cap > MAX_TOKENS {
        return Err(ConfigError::TokenCap { cap, max: MAX_TOKENS });
    }
    Ok(())
}

// Tokens must always make progress or they would never retire.
fn check_speed(speed: (f32, f32)) -> Result<(), ConfigError> {
    check_range("token_speed", speed)?;
    if speed.0 <= 0.0 {
        return Err(ConfigError::BadRange { what: "token_speed", min: speed.0, max: speed.1 });
    }
    Ok(())
}

fn check_unit(what: &'static str, v: f32) -> Result<(), ConfigError> {
    check_unit_range(what, (v, v))
}

fn check_unit_range(what: &'static str, r: (f32, f32)) -> Result<(), ConfigError> {
    check_range(what, r)?;
    if r.0 < 0.0 || r.1 > 1.0 {
        return Err(ConfigError::BadRange { what, min: r.0, max: r.1 });
    }
    Ok(())
}

fn non_empty<T>(what: &'static str, items: &[T]) -> Result<(), ConfigError> {
    if items.is_empty() {
        return Err(ConfigError::Empty(what));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        for kind in SceneKind::ALL {
            SceneConfig::default_for(kind).validate().unwrap();
            assert_eq!(SceneConfig::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn default_pipeline_is_seven_by_seven() {
        let c = PipelineConfig::default();
        assert_eq!(c.stages.len(), 7);
        assert_eq!(c.edges.len(), 7);
    }

    #[test]
    fn edge_to_undeclared_node_fails_fast() {
        let mut c = PipelineConfig::default();
        c.edges.push(EdgeSpec { from: "merge".into(), to: "ship".into() });
        assert_eq!(c.validate(), Err(ConfigError::UnknownNode { edge: 7, id: "ship".into() }));
    }

    #[test]
    fn duplicate_and_out_of_range_nodes() {
        let mut c = PipelineConfig::default();
        let dup = c.stages[0].clone();
        c.stages.push(dup);
        assert_eq!(c.validate(), Err(ConfigError::DuplicateNode("plan".into())));

        let mut c = PipelineConfig::default();
        c.stages[2].x = 1.5;
        assert!(matches!(c.validate(), Err(ConfigError::NodeOutOfRange { .. })));
    }

    #[test]
    fn caps_and_ranges() {
        let c = NetworkConfig { token_cap: MAX_TOKENS + 1, ..Default::default() };
        assert!(matches!(c.validate(), Err(ConfigError::TokenCap { .. })));

        let c = NetworkConfig { agents: MAX_AGENTS + 1, ..Default::default() };
        assert!(matches!(c.validate(), Err(ConfigError::TooMany { .. })));

        let c = NetworkConfig { token_speed: (0.0, 0.01), ..Default::default() };
        assert!(matches!(c.validate(), Err(ConfigError::BadRange { .. })));

        let c = GridConfig { restart: (0.3, 0.1), ..Default::default() };
        assert!(matches!(c.validate(), Err(ConfigError::BadRange { .. })));

        let c = GridConfig { cols: 0, ..Default::default() };
        assert_eq!(c.validate(), Err(ConfigError::Empty("grid")));
    }

    #[test]
    fn partial_overrides_keep_defaults() {
        let c: NetworkConfig = serde_json::from_str(r##"{ "agents": 12, "palette": ["#ffffff"] }"##).unwrap();
        assert_eq!(c.agents, 12);
        assert_eq!(c.link_distance, 120.0);
        assert_eq!(c.palette, vec![Rgb::new(255, 255, 255)]);
        c.validate().unwrap();
    }

    #[test]
    fn pipeline_from_json() {
        let json = r##"{
            "stages": [
                { "id": "a", "label": "A", "x": 0.1, "y": 0.5, "color": "#22c55e", "status": "done" },
                { "id": "b", "label": "B", "x": 0.9, "y": 0.5, "color": "#3b82f6" }
            ],
            "edges": [{ "from": "a", "to": "b" }],
            "token_cap": 2
        }"##;
        let c: PipelineConfig = serde_json::from_str(json).unwrap();
        c.validate().unwrap();
        assert_eq!(c.stages[1].status, Status::Waiting);
        assert_eq!(c.spawn_ms, 500);

        let bad = r##"{ "stages": [{ "id": "a", "label": "A", "x": 0, "y": 0, "color": "nope" }] }"##;
        assert!(serde_json::from_str::<PipelineConfig>(bad).is_err());
    }

    #[test]
    fn status_never_regresses() {
        assert_eq!(Status::Waiting.advance(), Status::Running);
        assert_eq!(Status::Running.advance(), Status::Done);
        assert_eq!(Status::Done.advance(), Status::Done);
    }
}

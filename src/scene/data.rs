// data.rs - Scripted scene content
//
// Stage status is illustrative, not derived from real work.

use super::palette::*;
use crate::config::{RowKind, Status};
use crate::world::Rgb;

/// (id, label, x, y, colour, status) with x/y in normalised [0, 1] layout space.
pub const PIPELINE_STAGES: [(&str, &str, f32, f32, Rgb, Status); 7] = [
    ("plan", "Plan", 0.08, 0.5, PRIMARY, Status::Done),
    ("code1", "Code (Auth)", 0.26, 0.25, BLUE, Status::Done),
    ("code2", "Code (API)", 0.26, 0.75, BLUE, Status::Running),
    ("test", "Test Suite", 0.48, 0.25, GREEN, Status::Running),
    ("review", "Code Review", 0.48, 0.75, ORANGE, Status::Waiting),
    ("merge", "Merge", 0.68, 0.5, CYAN, Status::Waiting),
    ("deploy", "Deploy", 0.88, 0.5, GREEN, Status::Waiting),
];

pub const PIPELINE_EDGES: [(&str, &str); 7] = [
    ("plan", "code1"),
    ("plan", "code2"),
    ("code1", "test"),
    ("code2", "review"),
    ("test", "merge"),
    ("review", "merge"),
    ("merge", "deploy"),
];

/// (name, depth, kind)
pub const FILE_ROWS: [(&str, u8, RowKind); 13] = [
    ("src/", 0, RowKind::Dir),
    ("auth/", 1, RowKind::Dir),
    ("middleware.ts", 2, RowKind::Modified),
    ("jwt.ts", 2, RowKind::Added),
    ("routes.ts", 2, RowKind::Modified),
    ("api/", 1, RowKind::Dir),
    ("users.ts", 2, RowKind::File),
    ("products.ts", 2, RowKind::Modified),
    ("utils/", 1, RowKind::Dir),
    ("crypto.ts", 2, RowKind::Added),
    ("tests/", 0, RowKind::Dir),
    ("auth.test.ts", 1, RowKind::Added),
    ("api.test.ts", 1, RowKind::File),
];

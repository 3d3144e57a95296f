// links.rs - Connection resolver
//
// Links are derived per frame and never outlive it: every resolver clears
// its output before filling it.

use super::grid::Cells;
use super::network::Agents;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

/// Every unordered pair of agents closer than `threshold`, fading linearly
/// from `max_alpha` at distance 0 to nothing at the threshold.
/// Quadratic in the agent count, which stays small.
pub fn proximity_links(agents: &Agents, threshold: f32, max_alpha: f32, out: &mut Vec<Link>) {
    out.clear();
    for i in 0..agents.n {
        let p = agents.pos(i);
        for j in i + 1..agents.n {
            let d = p.distance(agents.pos(j));
            if d < threshold {
                out.push(Link { a: i, b: j, alpha: (1.0 - d / threshold) * max_alpha });
            }
        }
    }
}

/// Each active cell to its right and lower neighbour when that one is
/// active too. Looking only right and down counts every pair once.
pub fn grid_links(cells: &Cells, weight: f32, out: &mut Vec<Link>) {
    out.clear();
    for i in 0..cells.len() {
        if !cells[i].active {
            continue;
        }
        for j in [cells.right_of(i), cells.below(i)].into_iter().flatten() {
            if cells[j].active {
                out.push(Link { a: i, b: j, alpha: weight });
            }
        }
    }
}

/// The declared edges, all of them, every frame.
pub fn edge_links(edges: &[(usize, usize)], weight: f32, out: &mut Vec<Link>) {
    out.clear();
    out.extend(edges.iter().map(|&(a, b)| Link { a, b, alpha: weight }));
}

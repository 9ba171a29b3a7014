//! Force-directed placement (Fruchterman-Reingold with radius-aware distances).

use crate::base::{self, Layout};
use marlin_model::cell::CellId;
use marlin_model::graph::Graph;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// Shared flag for stopping a running layout from another thread. Cancellation is
/// cooperative: the layout checks between iterations and leaves every geometry untouched
/// when it stops early.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct FastOrganicLayout {
    /// Ideal edge length driver. Clamped to a small positive minimum.
    pub force_constant: f64,
    /// Distances below this are treated as this, taming the repulsive singularity.
    pub min_distance_limit: f64,
    /// Pairs further apart than this exert no repulsion.
    pub max_distance_limit: f64,
    pub initial_temp: f64,
    /// Zero picks `20 * sqrt(n)` at execution time.
    pub max_iterations: u32,
    /// Translate the result back to the input extent's origin instead of (1, 1).
    pub use_input_origin: bool,
    cancel: CancelHandle,
    iterations_run: u32,
    temperature: f64,
}

impl Default for FastOrganicLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl FastOrganicLayout {
    pub fn new() -> Self {
        Self {
            force_constant: 50.0,
            min_distance_limit: 2.0,
            max_distance_limit: 500.0,
            initial_temp: 200.0,
            max_iterations: 0,
            use_input_origin: true,
            cancel: CancelHandle::new(),
            iterations_run: 0,
            temperature: 0.0,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn iterations_run(&self) -> u32 {
        self.iterations_run
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// Per-run scratch state, indexed in vertex order.
struct Simulation {
    location: Vec<[f64; 2]>,
    disp: Vec<[f64; 2]>,
    radius: Vec<f64>,
    radius_squared: Vec<f64>,
    movable: Vec<bool>,
    neighbours: Vec<Vec<usize>>,
    force_constant: f64,
    force_constant_squared: f64,
    min_distance_limit: f64,
    min_distance_limit_squared: f64,
    max_distance_limit: f64,
    jitter: Jitter,
}

impl Simulation {
    fn repulsion(&mut self) {
        let n = self.location.len();
        for i in 0..n {
            for j in i + 1..n {
                let mut x_delta = self.location[i][0] - self.location[j][0];
                let mut y_delta = self.location[i][1] - self.location[j][1];
                // Coincident centers get a deterministic nudge so the force is defined.
                if x_delta == 0.0 {
                    x_delta = 0.01 + self.jitter.next();
                }
                if y_delta == 0.0 {
                    y_delta = 0.01 + self.jitter.next();
                }
                let delta_length = (x_delta * x_delta + y_delta * y_delta).sqrt();
                let mut delta_with_radius = delta_length - self.radius[i] - self.radius[j];
                if delta_with_radius > self.max_distance_limit {
                    continue;
                }
                if delta_with_radius < self.min_distance_limit {
                    delta_with_radius = self.min_distance_limit;
                }
                let force = self.force_constant_squared / delta_with_radius;
                let dx = x_delta / delta_length * force;
                let dy = y_delta / delta_length * force;
                if self.movable[i] {
                    self.disp[i][0] += dx;
                    self.disp[i][1] += dy;
                }
                if self.movable[j] {
                    self.disp[j][0] -= dx;
                    self.disp[j][1] -= dy;
                }
            }
        }
    }

    fn attraction(&mut self) {
        for i in 0..self.location.len() {
            for k in 0..self.neighbours[i].len() {
                let j = self.neighbours[i][k];
                if i == j {
                    continue;
                }
                let x_delta = self.location[i][0] - self.location[j][0];
                let y_delta = self.location[i][1] - self.location[j][1];
                let mut delta_length_squared = x_delta * x_delta + y_delta * y_delta
                    - self.radius_squared[i]
                    - self.radius_squared[j];
                if delta_length_squared < self.min_distance_limit_squared {
                    delta_length_squared = self.min_distance_limit_squared;
                }
                let delta_length = delta_length_squared.sqrt();
                let force = delta_length_squared / self.force_constant;
                let dx = x_delta / delta_length * force;
                let dy = y_delta / delta_length * force;
                if self.movable[i] {
                    self.disp[i][0] -= dx;
                    self.disp[i][1] -= dy;
                }
                if self.movable[j] {
                    self.disp[j][0] += dx;
                    self.disp[j][1] += dy;
                }
            }
        }
    }

    fn integrate(&mut self, temperature: f64) {
        for i in 0..self.location.len() {
            if !self.movable[i] {
                continue;
            }
            let mut delta_length =
                (self.disp[i][0] * self.disp[i][0] + self.disp[i][1] * self.disp[i][1]).sqrt();
            if delta_length < 0.001 {
                delta_length = 0.001;
            }
            let scale = delta_length.min(temperature) / delta_length;
            self.location[i][0] += self.disp[i][0] * scale;
            self.location[i][1] += self.disp[i][1] * scale;
            self.disp[i] = [0.0, 0.0];
        }
    }
}

impl Layout for FastOrganicLayout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) {
        let vertices: Vec<CellId> = graph
            .child_vertices(parent)
            .into_iter()
            .filter(|&v| !base::is_vertex_ignored(graph, v) && !graph.connections(v).is_empty())
            .collect();
        let n = vertices.len();
        self.iterations_run = 0;
        self.temperature = self.initial_temp;
        if n == 0 {
            return;
        }
        let initial_bounds = if self.use_input_origin {
            graph.bounding_box_from_geometry(&vertices, false)
        } else {
            None
        };
        let force_constant = self.force_constant.max(0.001);
        let indices: FxHashMap<CellId, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();
        let mut sim = Simulation {
            location: Vec::with_capacity(n),
            disp: vec![[0.0, 0.0]; n],
            radius: Vec::with_capacity(n),
            radius_squared: Vec::with_capacity(n),
            movable: Vec::with_capacity(n),
            neighbours: Vec::with_capacity(n),
            force_constant,
            force_constant_squared: force_constant * force_constant,
            min_distance_limit: self.min_distance_limit,
            min_distance_limit_squared: self.min_distance_limit * self.min_distance_limit,
            max_distance_limit: self.max_distance_limit,
            jitter: Jitter::new(),
        };
        for (i, &vertex) in vertices.iter().enumerate() {
            let bounds = base::vertex_bounds(graph, vertex);
            sim.location
                .push([bounds.x + bounds.width / 2.0, bounds.y + bounds.height / 2.0]);
            let radius = bounds.width.min(bounds.height);
            sim.radius.push(radius);
            sim.radius_squared.push(radius * radius);
            sim.movable.push(base::is_vertex_movable(graph, vertex));
            // Terminals outside the laid-out set anchor to the vertex itself.
            let edges = graph.connections(vertex);
            let opposites = graph.opposites(&edges, vertex);
            sim.neighbours.push(
                opposites
                    .iter()
                    .map(|o| indices.get(o).copied().unwrap_or(i))
                    .collect(),
            );
        }
        let max_iterations = if self.max_iterations == 0 {
            (20.0 * (n as f64).sqrt()).round() as u32
        } else {
            self.max_iterations
        };
        graph.begin_update();
        let mut cancelled = false;
        for iteration in 0..max_iterations {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            sim.repulsion();
            sim.attraction();
            sim.integrate(self.temperature);
            self.iterations_run = iteration + 1;
            // Linear cooling that reaches exactly zero on the last iteration.
            self.temperature =
                self.initial_temp * (1.0 - (iteration + 1) as f64 / max_iterations as f64);
        }
        if !cancelled {
            let mut min_x: Option<f64> = None;
            let mut min_y: Option<f64> = None;
            for (i, &vertex) in vertices.iter().enumerate() {
                let Some(geo) = graph.model.geometry(vertex) else {
                    continue;
                };
                let x = (sim.location[i][0] - geo.width / 2.0).round();
                let y = (sim.location[i][1] - geo.height / 2.0).round();
                base::set_vertex_location(graph, vertex, x, y);
                min_x = Some(min_x.map_or(x, |m| m.min(x)));
                min_y = Some(min_y.map_or(y, |m| m.min(y)));
            }
            let mut dx = -min_x.unwrap_or(0.0) + 1.0;
            let mut dy = -min_y.unwrap_or(0.0) + 1.0;
            if let Some(bounds) = initial_bounds {
                dx += bounds.x;
                dy += bounds.y;
            }
            graph.move_cells(&vertices, dx, dy, false, None, None);
        } else {
            trace!(iterations = self.iterations_run, "organic layout cancelled");
        }
        graph.end_update();
    }
}

/// xorshift64, fixed seed. The nudge only breaks exact symmetry; it has no statistical
/// requirements, and a fixed seed keeps runs reproducible.
struct Jitter(u64);

impl Jitter {
    fn new() -> Self {
        Self(0x9E37_79B9_7F4A_7C15)
    }

    fn next(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}

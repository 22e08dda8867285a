#![forbid(unsafe_code)]

//! Linear-time tidy tree positioning (Buchheim, Jünger & Leipert's
//! improvement of Walker's algorithm), parameterized by a per-pair
//! separation.
//!
//! Input is an adjacency list over nodes numbered in pre-order with the root
//! at index 0. Output is one sibling-axis coordinate per node, in separation
//! units, with the root at 0. Depth-axis placement is the caller's business.
//!
//! # Invariants
//!
//! 1. Parents are centered over their first and last child.
//! 2. Adjacent nodes on the same depth are at least `separation(a, b)` apart.
//! 3. Identical inputs yield bit-identical outputs (no hashing, no
//!    iteration-order dependence).
//!
//! # Failure Modes
//!
//! - Malformed adjacency (cycles, indices out of range, non-pre-order
//!   numbering) is a caller bug; the layout module only ever builds valid
//!   lists. Such input produces meaningless coordinates but does not panic
//!   on index arithmetic beyond normal slice bounds checks.

/// Working state for one positioning run.
///
/// Index `n` (one past the last real node) is a virtual parent of the root,
/// so the root needs no special casing in the walks.
struct Walker<'a> {
    children: Vec<&'a [usize]>,
    parent: Vec<usize>,
    /// Position among siblings.
    number: Vec<usize>,
    /// Preliminary coordinate.
    prelim: Vec<f64>,
    /// Modifier applied to the whole subtree in the second walk.
    modifier: Vec<f64>,
    change: Vec<f64>,
    shift: Vec<f64>,
    thread: Vec<Option<usize>>,
    ancestor: Vec<usize>,
    /// Default ancestor, per parent.
    default_ancestor: Vec<Option<usize>>,
}

const VIRTUAL_ROOT: [usize; 1] = [0];

impl<'a> Walker<'a> {
    fn new(children: &'a [Vec<usize>]) -> Self {
        let n = children.len();
        let mut kids: Vec<&'a [usize]> = children.iter().map(Vec::as_slice).collect();
        kids.push(&VIRTUAL_ROOT);

        let mut parent = vec![n; n + 1];
        let mut number = vec![0; n + 1];
        for (p, list) in children.iter().enumerate() {
            for (i, &c) in list.iter().enumerate() {
                parent[c] = p;
                number[c] = i;
            }
        }

        Self {
            children: kids,
            parent,
            number,
            prelim: vec![0.0; n + 1],
            modifier: vec![0.0; n + 1],
            change: vec![0.0; n + 1],
            shift: vec![0.0; n + 1],
            thread: vec![None; n + 1],
            ancestor: (0..=n).collect(),
            default_ancestor: vec![None; n + 1],
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.children[v].first().copied().or(self.thread[v])
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.children[v].last().copied().or(self.thread[v])
    }

    fn previous_sibling(&self, v: usize) -> Option<usize> {
        let i = self.number[v];
        (i > 0).then(|| self.children[self.parent[v]][i - 1])
    }

    fn first_walk(&mut self, v: usize, separation: &impl Fn(usize, usize) -> f64) {
        let left = self.previous_sibling(v);
        let kids = self.children[v];
        if let (Some(&first), Some(&last)) = (kids.first(), kids.last()) {
            self.execute_shifts(v);
            let midpoint = (self.prelim[first] + self.prelim[last]) / 2.0;
            match left {
                Some(w) => {
                    self.prelim[v] = self.prelim[w] + separation(w, v);
                    self.modifier[v] = self.prelim[v] - midpoint;
                }
                None => self.prelim[v] = midpoint,
            }
        } else if let Some(w) = left {
            self.prelim[v] = self.prelim[w] + separation(w, v);
        }

        let p = self.parent[v];
        let siblings = self.children[p];
        let fallback = self.default_ancestor[p].unwrap_or(siblings[0]);
        self.default_ancestor[p] = Some(self.apportion(v, left, fallback, separation));
    }

    fn second_walk(&mut self, v: usize) {
        let pm = self.modifier[self.parent[v]];
        self.prelim[v] += pm;
        self.modifier[v] += pm;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let kids = self.children[v];
        for &w in kids.iter().rev() {
            self.prelim[w] += shift;
            self.modifier[w] += shift;
            change += self.change[w];
            shift += self.shift[w] + change;
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = self.number[wp].saturating_sub(self.number[wm]);
        let change = if subtrees == 0 {
            0.0
        } else {
            shift / subtrees as f64
        };
        self.change[wp] -= change;
        self.shift[wp] += shift;
        self.change[wm] += change;
        self.prelim[wp] += shift;
        self.modifier[wp] += shift;
    }

    fn next_ancestor(&self, vim: usize, v: usize, fallback: usize) -> usize {
        let a = self.ancestor[vim];
        if self.parent[a] == self.parent[v] {
            a
        } else {
            fallback
        }
    }

    /// Push `v`'s subtree right until it clears the forest to its left.
    fn apportion(
        &mut self,
        v: usize,
        left: Option<usize>,
        mut default_ancestor: usize,
        separation: &impl Fn(usize, usize) -> f64,
    ) -> usize {
        let Some(w) = left else {
            return default_ancestor;
        };

        // i = inner, o = outer; p = right (plus) contour, m = left (minus).
        let mut vop = v;
        let mut vom = self.children[self.parent[v]][0];
        let mut sip = self.modifier[v];
        let mut sop = self.modifier[v];
        let mut sim = self.modifier[w];
        let mut som = self.modifier[vom];

        let mut vim = self.next_right(w);
        let mut vip = self.next_left(v);
        while let (Some(im), Some(ip)) = (vim, vip) {
            vom = self.next_left(vom).unwrap_or(vom);
            vop = self.next_right(vop).unwrap_or(vop);
            self.ancestor[vop] = v;
            let shift = self.prelim[im] + sim - self.prelim[ip] - sip + separation(im, ip);
            if shift > 0.0 {
                let wm = self.next_ancestor(im, v, default_ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.modifier[im];
            sip += self.modifier[ip];
            som += self.modifier[vom];
            sop += self.modifier[vop];

            vim = self.next_right(im);
            vip = self.next_left(ip);
        }

        if let Some(im) = vim
            && self.next_right(vop).is_none()
        {
            self.thread[vop] = Some(im);
            self.modifier[vop] += sim - sop;
        }
        if let Some(ip) = vip
            && self.next_left(vom).is_none()
        {
            self.thread[vom] = Some(ip);
            self.modifier[vom] += sip - som;
            default_ancestor = v;
        }
        default_ancestor
    }
}

/// Children-before-parent order, children left to right.
fn post_order(children: &[Vec<usize>]) -> Vec<usize> {
    let mut out = Vec::with_capacity(children.len());
    let mut stack = vec![0usize];
    while let Some(v) = stack.pop() {
        out.push(v);
        stack.extend(children[v].iter().copied());
    }
    out.reverse();
    out
}

/// Compute sibling-axis coordinates for every node.
///
/// `children[i]` lists the children of node `i` in display order; nodes
/// must be numbered in pre-order with the root at 0. `separation(a, b)` is
/// the minimum distance between the centers of two horizontally adjacent
/// nodes. Returns an empty vector for empty input.
pub(crate) fn tidy_positions(
    children: &[Vec<usize>],
    separation: impl Fn(usize, usize) -> f64,
) -> Vec<f64> {
    let n = children.len();
    if n == 0 {
        return Vec::new();
    }
    let mut walker = Walker::new(children);

    for v in post_order(children) {
        walker.first_walk(v, &separation);
    }

    walker.modifier[n] = -walker.prelim[0];
    // Pre-order numbering means every parent precedes its children.
    for v in 0..n {
        walker.second_walk(v);
    }

    walker.prelim.truncate(n);
    walker.prelim
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(_: usize, _: usize) -> f64 {
        1.0
    }

    #[test]
    fn empty_input() {
        assert!(tidy_positions(&[], unit).is_empty());
    }

    #[test]
    fn single_root_at_origin() {
        assert_eq!(tidy_positions(&[vec![]], unit), vec![0.0]);
    }

    #[test]
    fn parent_centered_over_children() {
        // 0 -> 1, 2, 3
        let children = vec![vec![1, 2, 3], vec![], vec![], vec![]];
        let x = tidy_positions(&children, unit);
        assert_eq!(x, vec![0.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn subtrees_are_pushed_apart() {
        // 0 -> 1 (-> 2, 3), 4 (-> 5, 6)
        let children = vec![vec![1, 4], vec![2, 3], vec![], vec![], vec![5, 6], vec![], vec![]];
        let x = tidy_positions(&children, unit);
        // Grandchildren 3 and 5 must be a unit apart.
        assert!((x[5] - x[3] - 1.0).abs() < 1e-9, "{x:?}");
        assert!((x[1] - (x[2] + x[3]) / 2.0).abs() < 1e-9);
        assert!((x[4] - (x[5] + x[6]) / 2.0).abs() < 1e-9);
        assert!(x[0].abs() < 1e-9);
    }

    #[test]
    fn small_middle_subtree_is_spread() {
        // 0 -> 1 (-> 2, 3, 4), 5, 6 (-> 7, 8, 9)
        // The leaf 5 sits between two wide subtrees and is spaced evenly.
        let children = vec![
            vec![1, 5, 6],
            vec![2, 3, 4],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![7, 8, 9],
            vec![],
            vec![],
            vec![],
        ];
        let x = tidy_positions(&children, unit);
        assert!((x[5] - x[1] - (x[6] - x[5])).abs() < 1e-9, "{x:?}");
        assert!(x[7] - x[4] >= 1.0 - 1e-9);
    }

    #[test]
    fn separation_is_honored() {
        let children = vec![vec![1, 2], vec![], vec![]];
        let x = tidy_positions(&children, |_, _| 2.5);
        assert!((x[2] - x[1] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn deep_chain_stays_straight() {
        let children: Vec<Vec<usize>> = (0..50)
            .map(|i| if i < 49 { vec![i + 1] } else { vec![] })
            .collect();
        let x = tidy_positions(&children, unit);
        assert!(x.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn deterministic() {
        let children = vec![vec![1, 4, 5], vec![2, 3], vec![], vec![], vec![], vec![6], vec![]];
        let a = tidy_positions(&children, unit);
        let b = tidy_positions(&children, unit);
        let bits = |v: &[f64]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }
}

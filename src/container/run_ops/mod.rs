//! Merge sweeps over sorted run slices.
//!
//! Every function appends to `out` and assumes that `a` and `b` are minimal run lists.
//! `out` is expected to have room for `a.len() + b.len()` runs so that no sweep allocates.

use crate::container::run::Rle16;

/// Append a run to `out`, merging it into the last run if they overlap or touch
///
/// # Remarks
/// Assumes that `run.value` is not less than the start of the last run in `out`
pub fn append(out: &mut Vec<Rle16>, run: Rle16) {
    if let Some(last) = out.last_mut() {
        let last_end = last.end();

        if u32::from(run.value) <= last_end + 1 {
            let end = run.end();
            if end > last_end {
                last.length = (end - u32::from(last.value)) as u16;
            }

            return;
        }
    }

    out.push(run);
}

/// Calculate the union (`A ∪ B`) of two rle slices and append the result in `out`
pub fn union(a: &[Rle16], b: &[Rle16], out: &mut Vec<Rle16>) {
    let mut i_a = 0;
    let mut i_b = 0;

    while i_a < a.len() && i_b < b.len() {
        let v_a = a[i_a];
        let v_b = b[i_b];

        if v_a.value <= v_b.value {
            append(out, v_a);
            i_a += 1;
        }
        else {
            append(out, v_b);
            i_b += 1;
        }
    }

    for run in &a[i_a..] {
        append(out, *run);
    }

    for run in &b[i_b..] {
        append(out, *run);
    }
}

/// Calculate the intersection (`A ∩ B`) of two rle slices and append the result in `out`
///
/// # Remarks
/// When both active runs end at the same value both slices advance
pub fn intersect(a: &[Rle16], b: &[Rle16], out: &mut Vec<Rle16>) {
    let mut i_a = 0;
    let mut i_b = 0;

    while i_a < a.len() && i_b < b.len() {
        // Half open bounds so the end of the domain is representable
        let start_a = u32::from(a[i_a].value);
        let start_b = u32::from(b[i_b].value);
        let stop_a = a[i_a].end() + 1;
        let stop_b = b[i_b].end() + 1;

        if stop_a <= start_b {
            i_a += 1;
        }
        else if stop_b <= start_a {
            i_b += 1;
        }
        else {
            let latest_start = start_a.max(start_b);
            let earliest_stop;

            if stop_a == stop_b {
                earliest_stop = stop_a;
                i_a += 1;
                i_b += 1;
            }
            else if stop_a < stop_b {
                earliest_stop = stop_a;
                i_a += 1;
            }
            else {
                earliest_stop = stop_b;
                i_b += 1;
            }

            append(out, Rle16::new(latest_start as u16, (earliest_stop - latest_start - 1) as u16));
        }
    }
}

/// Calculate the difference (`A \ B`) of two rle slices and append the result in `out`
pub fn difference(a: &[Rle16], b: &[Rle16], out: &mut Vec<Rle16>) {
    let mut i_b = 0;

    for run in a {
        let mut start = u32::from(run.value);
        let stop = run.end();

        // Skip runs of `b` that end before this run
        while i_b < b.len() && b[i_b].end() < start {
            i_b += 1;
        }

        // A run of `b` that outlasts this run may still cut into the next one, so it's not consumed
        let mut i = i_b;
        while i < b.len() && u32::from(b[i].value) <= stop {
            let cut_start = u32::from(b[i].value);
            let cut_stop = b[i].end();

            if cut_start > start {
                append(out, Rle16::new(start as u16, (cut_start - 1 - start) as u16));
            }

            start = cut_stop + 1;
            if cut_stop >= stop {
                break;
            }

            i += 1;
        }

        i_b = i;

        if start <= stop {
            append(out, Rle16::new(start as u16, (stop - start) as u16));
        }
    }
}

/// Check if two rle slices share at least one value
pub fn intersects(a: &[Rle16], b: &[Rle16]) -> bool {
    let mut i_a = 0;
    let mut i_b = 0;

    while i_a < a.len() && i_b < b.len() {
        if a[i_a].end() < u32::from(b[i_b].value) {
            i_a += 1;
        }
        else if b[i_b].end() < u32::from(a[i_a].value) {
            i_b += 1;
        }
        else {
            return true;
        }
    }

    false
}

/// Check if every value of `a` is contained in `b`
pub fn subset(a: &[Rle16], b: &[Rle16]) -> bool {
    let mut i_b = 0;

    for run in a {
        while i_b < b.len() && b[i_b].end() < u32::from(run.value) {
            i_b += 1;
        }

        match b.get(i_b) {
            Some(outer) if outer.value <= run.value && outer.end() >= run.end() => (),
            _ => return false
        }
    }

    true
}

#[cfg(test)]
mod test {
    use super::*;

    fn runs(pairs: &[(u16, u16)]) -> Vec<Rle16> {
        pairs.iter()
            .map(|&(value, length)| Rle16::new(value, length))
            .collect()
    }

    fn pairs(runs: &[Rle16]) -> Vec<(u16, u16)> {
        runs.iter()
            .map(|run| (run.value, run.length))
            .collect()
    }

    #[test]
    fn append_merges_adjacent() {
        let mut out = runs(&[(0, 2)]);
        append(&mut out, Rle16::new(3, 1));
        append(&mut out, Rle16::new(4, 0));
        append(&mut out, Rle16::new(10, 0));

        assert_eq!(pairs(&out), vec![(0, 4), (10, 0)]);
    }

    #[test]
    fn append_at_domain_end() {
        let mut out = runs(&[(0, 0xFFFE)]);
        append(&mut out, Rle16::new(0xFFFF, 0));

        assert_eq!(pairs(&out), vec![(0, 0xFFFF)]);
    }

    #[test]
    fn union_example() {
        let a = runs(&[(0, 2), (10, 0)]);
        let b = runs(&[(2, 3)]);

        let mut out = Vec::new();
        union(&a, &b, &mut out);

        assert_eq!(pairs(&out), vec![(0, 5), (10, 0)]);
    }

    #[test]
    fn union_bridges_gap() {
        let a = runs(&[(0, 1), (5, 1)]);
        let b = runs(&[(2, 2)]);

        let mut out = Vec::new();
        union(&a, &b, &mut out);

        assert_eq!(pairs(&out), vec![(0, 6)]);
    }

    #[test]
    fn intersect_example() {
        let a = runs(&[(0, 2), (10, 0)]);
        let b = runs(&[(2, 3)]);

        let mut out = Vec::new();
        intersect(&a, &b, &mut out);

        assert_eq!(pairs(&out), vec![(2, 0)]);
    }

    #[test]
    fn intersect_shared_stop() {
        let a = runs(&[(0, 9), (20, 5)]);
        let b = runs(&[(5, 4), (22, 3)]);

        let mut out = Vec::new();
        intersect(&a, &b, &mut out);

        assert_eq!(pairs(&out), vec![(5, 4), (22, 3)]);
    }

    #[test]
    fn intersect_full_domain() {
        let a = runs(&[(0, 0xFFFF)]);
        let b = runs(&[(7, 3), (0xFFF0, 0xF)]);

        let mut out = Vec::new();
        intersect(&a, &b, &mut out);

        assert_eq!(pairs(&out), pairs(&b));
    }

    #[test]
    fn difference_cuts() {
        let a = runs(&[(0, 9), (20, 9)]);
        let b = runs(&[(3, 1), (8, 13), (25, 0)]);

        let mut out = Vec::new();
        difference(&a, &b, &mut out);

        assert_eq!(pairs(&out), vec![(0, 2), (5, 2), (22, 2), (26, 3)]);
    }

    #[test]
    fn difference_removes_everything() {
        let a = runs(&[(4, 4), (0xFFF0, 0xF)]);
        let b = runs(&[(0, 0xFFFF)]);

        let mut out = Vec::new();
        difference(&a, &b, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn intersects_and_subset() {
        let a = runs(&[(2, 2), (10, 0)]);
        let b = runs(&[(0, 5), (8, 4)]);
        let c = runs(&[(5, 2)]);

        assert!(intersects(&a, &b));
        assert!(!intersects(&a, &c));
        assert!(subset(&a, &b));
        assert!(!subset(&b, &a));
        assert!(subset(&[], &a));
    }
}

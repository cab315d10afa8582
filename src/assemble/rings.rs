//! Ring building from relation outer members.

use geo::{Coord, LineString};

/// Rings recovered from a set of outer member coordinate sequences
#[derive(Debug, Default)]
pub struct RingSet {
    pub rings: Vec<LineString<f64>>,
    /// Members or stitched chains that could not form a closed ring
    pub dropped: usize,
}

fn is_closed_ring(coords: &[Coord<f64>]) -> bool {
    coords.len() >= 4 && coords.first() == coords.last()
}

fn is_finite(coords: &[Coord<f64>]) -> bool {
    coords.iter().all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Turn outer member segments into closed rings.
///
/// Members that are already closed are used as-is. Open members are joined
/// end-to-end; a chain only becomes a ring if it closes on its own. Nothing is
/// force-closed, so unrelated open fragments never fabricate an area.
pub fn build_rings(segments: Vec<Vec<Coord<f64>>>) -> RingSet {
    let mut set = RingSet::default();
    let mut open = Vec::new();

    for segment in segments {
        if segment.len() < 2 || !is_finite(&segment) {
            set.dropped += 1;
        } else if segment.first() == segment.last() {
            if is_closed_ring(&segment) {
                set.rings.push(LineString::new(segment));
            } else {
                set.dropped += 1;
            }
        } else {
            open.push(segment);
        }
    }

    for chain in stitch(open) {
        if is_closed_ring(&chain) {
            set.rings.push(LineString::new(chain));
        } else {
            set.dropped += 1;
        }
    }

    set
}

/// Join open segments that share endpoints, reversing them where needed.
fn stitch(segments: Vec<Vec<Coord<f64>>>) -> Vec<Vec<Coord<f64>>> {
    let mut chains = Vec::new();
    let mut remaining = segments;

    while !remaining.is_empty() {
        let mut chain = remaining.remove(0);
        while chain.first() != chain.last() {
            let Some(i) = remaining.iter().position(|s| touches(&chain, s)) else {
                break;
            };
            let segment = remaining.remove(i);
            attach(&mut chain, segment);
        }
        chains.push(chain);
    }

    chains
}

fn endpoints(coords: &[Coord<f64>]) -> Option<(Coord<f64>, Coord<f64>)> {
    Some((*coords.first()?, *coords.last()?))
}

fn touches(chain: &[Coord<f64>], segment: &[Coord<f64>]) -> bool {
    match (endpoints(chain), endpoints(segment)) {
        (Some((a, b)), Some((c, d))) => a == c || a == d || b == c || b == d,
        _ => false,
    }
}

/// Extend `chain` with `segment` at whichever end they share, dropping the
/// duplicated joint vertex. Tail joins win over head joins.
fn attach(chain: &mut Vec<Coord<f64>>, mut segment: Vec<Coord<f64>>) {
    let (Some((start, end)), Some((first, last))) = (endpoints(chain), endpoints(&segment)) else {
        return;
    };

    if end == first || end == last {
        if end == last {
            segment.reverse();
        }
        chain.extend(segment.into_iter().skip(1));
    } else if start == last || start == first {
        if start == first {
            segment.reverse();
        }
        segment.pop();
        segment.append(chain);
        *chain = segment;
    }
}

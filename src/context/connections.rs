//! Prefix relations between generated paths.

use super::expansion::GeneratedPath;

/// Finds which generated paths extend which others
///
/// Implementations return `(shorter_key, longer_key)` pairs where the
/// shorter path's node sequence is a strict prefix of the longer one.
pub trait PathConnector {
    fn connections(&self, paths: &[GeneratedPath]) -> Vec<(String, String)>;
}

/// Compares every unordered pair once
///
/// Pairs are visited in generation order, taking each pair only when the
/// first key sorts before the second. Quadratic in the number of paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairsPrefix;

impl PathConnector for AllPairsPrefix {
    fn connections(&self, paths: &[GeneratedPath]) -> Vec<(String, String)> {
        let mut connections = Vec::new();

        for first in paths {
            for second in paths {
                if first.key >= second.key {
                    continue;
                }

                let (shorter, longer) = match first.nodes.len().cmp(&second.nodes.len()) {
                    std::cmp::Ordering::Less => (first, second),
                    std::cmp::Ordering::Greater => (second, first),
                    std::cmp::Ordering::Equal => continue,
                };

                if longer.nodes.starts_with(&shorter.nodes) {
                    connections.push((shorter.key.clone(), longer.key.clone()));
                }
            }
        }

        connections
    }
}

// Shuffled merge of several lazy sequences.
//
// `ShuffledInterleave` holds a pool of iterators. Each pull picks one source
// uniformly at random from the pool, takes its next item and drops the
// source once it runs dry. Items from any one source keep their order; only
// the order across sources is shuffled. Without a PRNG it always pulls from
// the first remaining source, which is plain concatenation.
//
// The search engine nests these at every branching point, so a subtree is
// consumed a little at a time from all of its children instead of one child
// to exhaustion before the next.

use cantus_prng::SearchRng;

pub struct ShuffledInterleave<I> {
    sources: Vec<I>,
    rng: Option<SearchRng>,
}

impl<I: Iterator> ShuffledInterleave<I> {
    pub fn new(sources: Vec<I>, rng: Option<SearchRng>) -> Self {
        Self { sources, rng }
    }

    /// Concatenate `sources` in order.
    pub fn ordered(sources: Vec<I>) -> Self {
        Self::new(sources, None)
    }

    pub fn remaining_sources(&self) -> usize {
        self.sources.len()
    }
}

impl<I: Iterator> Iterator for ShuffledInterleave<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        while !self.sources.is_empty() {
            let index = match self.rng.as_mut() {
                Some(rng) => rng.range_usize(0, self.sources.len()),
                None => 0,
            };
            match self.sources[index].next() {
                Some(item) => return Some(item),
                None => {
                    self.sources.remove(index);
                }
            }
        }
        None
    }
}

/// Applies `f` to every element of `items`, returning the results in the input order.
///
/// When the `parallel` feature is enabled and `parallel` is `true`, the elements are
/// processed on the `rayon` thread pool. The output order never depends on the number
/// of worker threads.
pub fn map_ordered<T, R, F>(parallel: bool, items: Vec<T>, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if parallel && items.len() > 1 {
            use rayon::prelude::*;
            return items.into_par_iter().map(f).collect();
        }
    }

    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    items.into_iter().map(f).collect()
}

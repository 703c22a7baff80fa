use core::mem;

/// LSD radix sort of parallel `keys` / `vals` slices by key, ascending.
/// - Stable: equal keys keep their relative order
/// - `vals` is permuted alongside `keys`
///
/// Four byte passes, each O(n + 256). Short inputs fall back to insertion sort.
pub fn radix_sort_u32_soa<N: Copy + Default>(keys: &mut [u32], vals: &mut [N]) {
    assert_eq!(keys.len(), vals.len());
    let n = keys.len();
    if n <= 1 {
        return;
    }
    if n <= 32 {
        insertion_sort_u32_soa(keys, vals);
        return;
    }

    let mut keys_tmp = vec![0u32; n];
    let mut vals_tmp = vec![N::default(); n];

    let mut src_keys: &mut [u32] = keys;
    let mut src_vals: &mut [N] = vals;
    let mut dst_keys: &mut [u32] = &mut keys_tmp;
    let mut dst_vals: &mut [N] = &mut vals_tmp;

    for shift in [0u32, 8, 16, 24] {
        let mut count = [0usize; 256];
        for &k in src_keys.iter() {
            count[((k >> shift) & 0xFF) as usize] += 1;
        }

        // prefix sum -> first slot of each bucket
        let mut sum = 0usize;
        for c in count.iter_mut() {
            let tmp = *c;
            *c = sum;
            sum += tmp;
        }

        for idx in 0..n {
            let k = src_keys[idx];
            let b = ((k >> shift) & 0xFF) as usize;
            let pos = count[b];
            count[b] = pos + 1;
            dst_keys[pos] = k;
            dst_vals[pos] = src_vals[idx];
        }

        mem::swap(&mut src_keys, &mut dst_keys);
        mem::swap(&mut src_vals, &mut dst_vals);
    }
    // even pass count: the sorted data is back in the caller's slices
}

fn insertion_sort_u32_soa<N: Copy>(keys: &mut [u32], vals: &mut [N]) {
    for i in 1..keys.len() {
        let k = keys[i];
        let v = vals[i];
        let mut j = i;
        while j > 0 && keys[j - 1] > k {
            keys[j] = keys[j - 1];
            vals[j] = vals[j - 1];
            j -= 1;
        }
        keys[j] = k;
        vals[j] = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline_stable_sort<N: Copy>(keys: &[u32], vals: &[N]) -> (Vec<u32>, Vec<N>) {
        let mut pairs: Vec<(u32, N)> = keys.iter().copied().zip(vals.iter().copied()).collect();
        pairs.sort_by_key(|p| p.0);
        pairs.into_iter().unzip()
    }

    /// xorshift32
    struct Rng(u32);
    impl Rng {
        fn next_u32(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
    }

    #[test]
    fn handles_empty_and_single() {
        let mut keys: Vec<u32> = vec![];
        let mut vals: Vec<f64> = vec![];
        radix_sort_u32_soa(&mut keys, &mut vals);
        assert!(keys.is_empty());

        let mut keys = vec![42u32];
        let mut vals = vec![0.5f64];
        radix_sort_u32_soa(&mut keys, &mut vals);
        assert_eq!(keys, vec![42]);
        assert_eq!(vals, vec![0.5]);
    }

    #[test]
    fn is_stable_on_duplicates() {
        let mut keys = vec![3u32, 1, 3, 2, 1, 3, 0];
        let mut vals: Vec<u32> = (0..keys.len() as u32).collect();
        let (base_k, base_v) = baseline_stable_sort(&keys, &vals);
        radix_sort_u32_soa(&mut keys, &mut vals);
        assert_eq!(keys, base_k);
        assert_eq!(vals, base_v);
    }

    #[test]
    fn matches_baseline_across_sizes() {
        let mut rng = Rng(0x1234_5678);
        for &n in &[2usize, 31, 32, 33, 64, 129, 1024] {
            let mut keys = Vec::with_capacity(n);
            let mut vals = Vec::with_capacity(n);
            for i in 0..n {
                keys.push(rng.next_u32() & 0x00FF_FFFF);
                vals.push(i as u32);
            }
            let (base_k, base_v) = baseline_stable_sort(&keys, &vals);
            radix_sort_u32_soa(&mut keys, &mut vals);
            assert_eq!(keys, base_k, "keys mismatch at n={n}");
            assert_eq!(vals, base_v, "vals mismatch at n={n}");
        }
    }
}

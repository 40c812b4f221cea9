use super::*;
use crate::drivers::block::RamDisk;
use alloc::vec;
use std::thread;

fn setup(nbuf: usize, nbuckets: usize) -> (Arc<RamDisk>, BufferCache) {
    let disk = Arc::new(RamDisk::new(BSIZE, 64));
    let disks: Vec<Arc<dyn BlockDevice>> = vec![disk.clone()];
    let cache = BufferCache::new(BcacheConfig { nbuf, nbuckets }, disks).unwrap();
    (disk, cache)
}

#[test]
fn test_init_all_in_bucket_zero() {
    let (_disk, cache) = setup(6, 3);
    assert_eq!(cache.bucket_len(0), 6);
    assert_eq!(cache.bucket_len(1), 0);
    assert_eq!(cache.bucket_len(2), 0);
    assert!(cache.check_invariants());
}

#[test]
fn test_two_buckets_four_buffers() {
    let (_disk, cache) = setup(4, 2);

    // Bloco 0 mora no bucket 0: recicla lá mesmo
    let b0 = cache.get(0, 0);
    // Bloco 1 mora no bucket 1, vazio: rouba do bucket 0
    let b1 = cache.get(0, 1);
    assert_eq!(cache.stats().steals, 1);
    assert_eq!(cache.bucket_len(0), 3);
    assert_eq!(cache.bucket_len(1), 1);
    let (i0, i1) = (b0.index(), b1.index());
    drop(b0);
    drop(b1);

    let again0 = cache.get(0, 0);
    let again1 = cache.get(0, 1);
    assert_eq!(again0.index(), i0);
    assert_eq!(again1.index(), i1);

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.steals, 1);
    drop(again0);
    drop(again1);
    assert!(cache.check_invariants());
}

#[test]
fn test_read_hit_does_not_touch_disk() {
    let (disk, cache) = setup(4, 2);
    disk.write_block(3, &[0xAB; BSIZE]).unwrap();

    let buf = cache.read(0, 3).unwrap();
    assert!(buf.is_valid());
    assert_eq!(buf[0], 0xAB);
    buf.release();
    assert_eq!(disk.reads(), 1);

    let buf = cache.read(0, 3).unwrap();
    assert_eq!(buf[BSIZE - 1], 0xAB);
    assert_eq!(disk.reads(), 1);
    assert_eq!(cache.stats().reads, 1);
}

#[test]
fn test_write_reaches_disk() {
    let (disk, cache) = setup(4, 2);

    let mut buf = cache.read(0, 7).unwrap();
    buf.data_mut()[..4].copy_from_slice(b"blk!");
    buf.write().unwrap();
    drop(buf);

    assert_eq!(&disk.peek(7).unwrap()[..4], b"blk!");
    assert_eq!(disk.writes(), 1);
    assert_eq!(cache.stats().writes, 1);
}

#[test]
fn test_smaller_device_blocks() {
    let disk = Arc::new(RamDisk::new(512, 16));
    disk.write_block(2, &[1; 512]).unwrap();
    disk.write_block(3, &[2; 512]).unwrap();
    let disks: Vec<Arc<dyn BlockDevice>> = vec![disk.clone()];
    let cache = BufferCache::new(BcacheConfig::default(), disks).unwrap();

    let buf = cache.read(0, 1).unwrap();
    assert_eq!(buf[0], 1);
    assert_eq!(buf[512], 2);
    assert_eq!(disk.reads(), 2);
}

#[test]
fn test_release_moves_to_mru() {
    let (_disk, cache) = setup(3, 1);
    let b0 = cache.get(0, 0);
    let b1 = cache.get(0, 1);
    let b2 = cache.get(0, 2);
    drop(b0);
    drop(b1);
    drop(b2);

    // LRU agora é o bloco 0: o próximo miss fica com o slot dele
    let b3 = cache.get(0, 3);
    assert_eq!(cache.refcnt(0, 0), None);
    assert_eq!(cache.refcnt(0, 1), Some(0));
    assert_eq!(cache.refcnt(0, 3), Some(1));
    drop(b3);
    assert!(cache.check_invariants());
}

#[test]
fn test_referenced_buffer_not_recycled() {
    let (_disk, cache) = setup(2, 1);
    let held = cache.get(0, 0);
    cache.get(0, 1).release();

    let b2 = cache.get(0, 2);
    assert_ne!(b2.index(), held.index());
    assert_eq!(cache.refcnt(0, 0), Some(1));
    assert_eq!(cache.refcnt(0, 1), None);
}

#[test]
fn test_read_error_releases_buffer() {
    let (disk, cache) = setup(2, 1);
    disk.set_failing(true);
    assert_eq!(cache.read(0, 5).err(), Some(BlockError::IoError));
    assert_eq!(cache.refcnt(0, 5), Some(0));

    disk.set_failing(false);
    let buf = cache.read(0, 5).unwrap();
    assert!(buf.is_valid());
    assert_eq!(disk.reads(), 1);
}

#[test]
fn test_unknown_device() {
    let (_disk, cache) = setup(2, 1);
    assert_eq!(cache.read(3, 0).err(), Some(BlockError::NotFound));
    // Nenhum buffer ficou preso
    assert_eq!(cache.stats().misses, 0);
}

#[test]
fn test_invalid_config() {
    let disks: Vec<Arc<dyn BlockDevice>> = Vec::new();
    let bad = BcacheConfig { nbuf: 0, nbuckets: 4 };
    assert_eq!(BufferCache::new(bad, disks).err(), Some(BcacheError::InvalidConfig));

    let odd: Vec<Arc<dyn BlockDevice>> = vec![Arc::new(RamDisk::new(3000, 4))];
    assert_eq!(
        BufferCache::new(BcacheConfig::default(), odd).err(),
        Some(BcacheError::UnsupportedBlockSize)
    );
}

#[test]
fn test_pin_outlives_guard() {
    let (_disk, cache) = setup(1, 1);
    let buf = cache.get(0, 9);
    let pin = buf.pin();
    drop(buf);
    assert_eq!(cache.refcnt(0, 9), Some(1));
    assert_eq!(pin.blockno(), 9);

    pin.unpin();
    assert_eq!(cache.refcnt(0, 9), Some(0));
    // Slot único liberado: outro bloco pode usá-lo
    cache.get(0, 10).release();
}

#[test]
#[should_panic(expected = "bget: no buffers")]
fn test_exhaustion_panics() {
    let (_disk, cache) = setup(2, 2);
    let _a = cache.get(0, 0);
    let _b = cache.get(0, 1);
    let _c = cache.get(0, 2);
}

#[test]
#[should_panic(expected = "bunpin: refcnt zero")]
fn test_unpin_underflow_panics() {
    let (_disk, cache) = setup(1, 1);
    let buf = cache.get(0, 0);
    let index = buf.index();
    drop(buf);
    cache.unpin_index(index);
}

#[test]
fn test_concurrent_exclusive_access() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 200;
    const BLOCKS: u32 = 5;

    let (disk, cache) = setup(6, 3);

    thread::scope(|s| {
        for t in 0..THREADS {
            let cache = &cache;
            s.spawn(move || {
                for round in 0..ROUNDS {
                    let blockno = ((t + round) % BLOCKS as usize) as u32;
                    let mut buf = cache.read(0, blockno).unwrap();
                    // Incremento não atômico: só é correto com posse exclusiva
                    let mut counter = [0u8; 8];
                    counter.copy_from_slice(&buf[..8]);
                    let value = u64::from_le_bytes(counter) + 1;
                    buf.data_mut()[..8].copy_from_slice(&value.to_le_bytes());
                    buf.write().unwrap();
                }
            });
        }
    });

    let total: u64 = (0..BLOCKS as u64)
        .map(|lba| {
            let data = disk.peek(lba).unwrap();
            let mut counter = [0u8; 8];
            counter.copy_from_slice(&data[..8]);
            u64::from_le_bytes(counter)
        })
        .sum();
    assert_eq!(total, (THREADS * ROUNDS) as u64);
    assert!(cache.check_invariants());
    for blockno in 0..BLOCKS {
        assert_eq!(cache.refcnt(0, blockno).unwrap_or(0), 0);
    }
}

#[test]
fn test_recycled_buffer_rereads_device() {
    let (disk, cache) = setup(1, 1);
    disk.write_block(0, &[0x11; BSIZE]).unwrap();
    disk.write_block(1, &[0x22; BSIZE]).unwrap();

    let buf = cache.read(0, 0).unwrap();
    assert!(buf.iter().all(|&b| b == 0x11));
    buf.release();

    // Slot único reaproveitado: o conteúdo antigo não pode vazar
    let buf = cache.read(0, 1).unwrap();
    assert!(buf.iter().all(|&b| b == 0x22));
    assert_eq!(disk.reads(), 2);
    assert_eq!(cache.refcnt(0, 0), None);
}

#[test]
#[should_panic(expected = "brelse: refcnt zero")]
fn test_release_underflow_panics() {
    let (_disk, cache) = setup(1, 1);
    let buf = cache.get(0, 0);
    let index = buf.index();
    drop(buf);
    cache.release_index(index);
}

#[test]
fn test_concurrent_churn_with_eviction() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 300;
    const BLOCKS: u32 = 10;

    // Mais blocos que buffers: misses roubam entre buckets nos dois sentidos
    let (disk, cache) = setup(6, 3);

    thread::scope(|s| {
        for t in 0..THREADS {
            let cache = &cache;
            s.spawn(move || {
                for round in 0..ROUNDS {
                    let blockno = ((t * 7 + round * 3) % BLOCKS as usize) as u32;
                    let mut buf = cache.read(0, blockno).unwrap();
                    assert!(cache.refcnt(0, blockno).unwrap_or(0) >= 1);

                    let mut counter = [0u8; 8];
                    counter.copy_from_slice(&buf[..8]);
                    let value = u64::from_le_bytes(counter) + 1;
                    buf.data_mut()[..8].copy_from_slice(&value.to_le_bytes());
                    buf.write().unwrap();
                }
            });
        }
    });

    let total: u64 = (0..BLOCKS as u64)
        .map(|lba| {
            let data = disk.peek(lba).unwrap();
            let mut counter = [0u8; 8];
            counter.copy_from_slice(&data[..8]);
            u64::from_le_bytes(counter)
        })
        .sum();
    assert_eq!(total, (THREADS * ROUNDS) as u64);

    // Cada buffer em uma lista só, nenhuma chave repetida
    assert!(cache.check_invariants());
    let cached = (0..BLOCKS).filter(|&b| cache.refcnt(0, b).is_some()).count();
    assert!(cached <= cache.nbuf());
    for blockno in 0..BLOCKS {
        assert_eq!(cache.refcnt(0, blockno).unwrap_or(0), 0);
    }
    assert!(cache.stats().steals > 0);
}

#[test]
fn test_global_instance() {
    let disks: Vec<Arc<dyn BlockDevice>> = vec![Arc::new(RamDisk::new(BSIZE, 8))];
    let cache = init(BcacheConfig::default(), disks).unwrap();
    assert_eq!(cache.nbuf(), NBUF);
    assert_eq!(cache.nbuckets(), NBUCKETS);
    assert!(core::ptr::eq(cache, super::cache().unwrap()));

    let again = init(BcacheConfig::default(), Vec::new());
    assert_eq!(again.err(), Some(BcacheError::AlreadyInitialized));

    let buf = bread(0, 1).unwrap();
    assert!(buf.is_valid());
}

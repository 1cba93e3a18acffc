//! Message encoding/decoding benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pbwire_codec::{CodecError, Message, Reader, Tag, WireType, Writer};
use pbwire_types::{Any, Timestamp};

#[derive(Debug, Clone, Default, PartialEq)]
struct Fill {
    taker: String,
    maker: String,
    notional: u64,
    affiliate_fee: u64,
}

impl Message for Fill {
    fn encode_raw(&self, writer: &mut Writer) -> Result<(), CodecError> {
        if !self.taker.is_empty() {
            writer
                .write_tag(1, WireType::LengthDelimited)
                .write_string(&self.taker);
        }
        if !self.maker.is_empty() {
            writer
                .write_tag(2, WireType::LengthDelimited)
                .write_string(&self.maker);
        }
        if self.notional != 0 {
            writer.write_tag(3, WireType::Varint).write_uint64(self.notional);
        }
        if self.affiliate_fee != 0 {
            writer
                .write_tag(4, WireType::Varint)
                .write_uint64(self.affiliate_fee);
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: Tag, reader: &mut Reader<'_>) -> Result<(), CodecError> {
        match tag.field_number() {
            1 if reader.accept(tag, WireType::LengthDelimited)? => {
                self.taker = reader.read_string()?
            }
            2 if reader.accept(tag, WireType::LengthDelimited)? => {
                self.maker = reader.read_string()?
            }
            3 if reader.accept(tag, WireType::Varint)? => self.notional = reader.read_uint64()?,
            4 if reader.accept(tag, WireType::Varint)? => {
                self.affiliate_fee = reader.read_uint64()?
            }
            1..=4 => {}
            _ => reader.skip_field(tag)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct BlockStats {
    time: Option<Timestamp>,
    heights: Vec<u32>,
    fills: Vec<Fill>,
}

impl Message for BlockStats {
    fn encode_raw(&self, writer: &mut Writer) -> Result<(), CodecError> {
        if let Some(time) = &self.time {
            writer.write_message(1, time)?;
        }
        writer.write_packed(2, self.heights.iter().copied(), Writer::write_uint32)?;
        for fill in &self.fills {
            writer.write_message(3, fill)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: Tag, reader: &mut Reader<'_>) -> Result<(), CodecError> {
        match tag.field_number() {
            1 if reader.accept(tag, WireType::LengthDelimited)? => {
                reader.merge_message(self.time.get_or_insert_with(Default::default))?
            }
            2 => reader.read_repeated(
                tag,
                WireType::Varint,
                &mut self.heights,
                Reader::read_uint32,
            )?,
            3 if reader.accept(tag, WireType::LengthDelimited)? => {
                self.fills.push(reader.read_message()?)
            }
            1 | 3 => {}
            _ => reader.skip_field(tag)?,
        }
        Ok(())
    }
}

fn create_block(fills: usize) -> BlockStats {
    BlockStats {
        time: Some(Timestamp::new(1_700_000_000, 250_000_000)),
        heights: (0..fills as u32).map(|i| 1_000_000 + i).collect(),
        fills: (0..fills)
            .map(|i| Fill {
                taker: format!("dydx1taker{i:08}"),
                maker: format!("dydx1maker{i:08}"),
                notional: 1_000_000 * i as u64,
                affiliate_fee: i as u64,
            })
            .collect(),
    }
}

fn bench_message_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_encode");

    for fills in [1, 10, 100, 1000] {
        let block = create_block(fills);

        group.throughput(Throughput::Elements(fills as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fills), &block, |b, block| {
            let mut writer = Writer::new();
            b.iter(|| {
                block.encode(&mut writer).unwrap();
                black_box(writer.finish().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_message_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_decode");

    for fills in [1, 10, 100, 1000] {
        let encoded = create_block(fills).encode_to_bytes().unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fills), &encoded, |b, encoded| {
            b.iter(|| black_box(BlockStats::decode_bytes(encoded).unwrap()));
        });
    }

    group.finish();
}

fn bench_fields_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("fields_scan");

    for fills in [10, 1000] {
        let encoded = create_block(fills).encode_to_bytes().unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fills), &encoded, |b, encoded| {
            b.iter(|| {
                let mut reader = Reader::new(encoded);
                black_box(reader.fields().filter(Result::is_ok).count())
            });
        });
    }

    group.finish();
}

fn bench_any(c: &mut Criterion) {
    let mut group = c.benchmark_group("any");
    let timestamp = Timestamp::new(1_700_000_000, 1);

    group.bench_function("pack", |b| {
        b.iter(|| black_box(Any::pack(black_box(&timestamp)).unwrap()));
    });

    let any = Any::pack(&timestamp).unwrap();
    group.bench_function("unpack", |b| {
        b.iter(|| black_box(any.unpack::<Timestamp>().unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_message_encode,
    bench_message_decode,
    bench_fields_scan,
    bench_any,
);
criterion_main!(benches);

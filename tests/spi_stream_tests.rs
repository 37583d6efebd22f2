//! SPI master backend tests

mod common;

use common::{buffer, contents, MockSpi, Recorder, Trace};
use rust_data_streaming::backend::spi::SPI_EVENTS;
use rust_data_streaming::hal::SpiEvent;
use rust_data_streaming::{
    setup_spi, IsrPriority, SpiStreamConfig, StreamError, TransferTag, XferResult,
};

#[test]
fn test_setup_enables_done_and_error() {
    let trace = Trace::default();
    let cb = |_: TransferTag, _: XferResult| {};
    let mut bus = MockSpi { trace: &trace };

    let _iface = setup_spi(&mut bus, &SpiStreamConfig::default(), &cb);

    assert_eq!(trace.enabled(), Some((SPI_EVENTS, IsrPriority::DEFAULT)));
}

#[test]
fn test_send_is_write_only() {
    let trace = Trace::default();
    let rec = Recorder::default();
    let cb = |tag: TransferTag, result: XferResult| rec.record(tag, result);
    let mut bus = MockSpi { trace: &trace };
    let tx = buffer([0x9F, 0x00, 0x00]);

    let iface = setup_spi(&mut bus, &SpiStreamConfig::default(), &cb);

    assert_eq!(iface.send(tx, TransferTag(0)), Ok(()));
    iface.on_event(SpiEvent::Done.into());

    assert_eq!(rec.calls(), vec![(TransferTag(0), Ok(()))]);
    assert_eq!(trace.written(), vec![vec![0x9F, 0x00, 0x00]]);
    assert!(trace.reads().is_empty());
}

#[test]
fn test_receive_is_read_only() {
    let trace = Trace::with_rx(&[0xDE, 0xAD, 0xBE, 0xEF]);
    let rec = Recorder::default();
    let cb = |tag: TransferTag, result: XferResult| rec.record(tag, result);
    let mut bus = MockSpi { trace: &trace };
    let rx = buffer([0u8; 4]);

    let iface = setup_spi(&mut bus, &SpiStreamConfig::default(), &cb);

    assert_eq!(iface.receive(rx, TransferTag(3)), Ok(()));
    iface.on_event(SpiEvent::Done.into());

    assert_eq!(rec.calls(), vec![(TransferTag(3), Ok(()))]);
    assert!(trace.written().is_empty());
    assert_eq!(contents(rx), [0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn test_error_event_reports_transfer() {
    let trace = Trace::default();
    let rec = Recorder::default();
    let cb = |tag: TransferTag, result: XferResult| rec.record(tag, result);
    let mut bus = MockSpi { trace: &trace };
    let tx = buffer([1, 2]);

    let iface = setup_spi(&mut bus, &SpiStreamConfig::default(), &cb);

    iface.send(tx, TransferTag(8)).unwrap();
    iface.on_event(SpiEvent::Error.into());

    assert_eq!(rec.calls(), vec![(TransferTag(8), Err(StreamError::Transfer))]);
    assert!(iface.is_idle());
}

#[test]
fn test_busy_then_reuse() {
    let trace = Trace::default();
    let rec = Recorder::default();
    let cb = |tag: TransferTag, result: XferResult| rec.record(tag, result);
    let mut bus = MockSpi { trace: &trace };
    let a = buffer([1]);
    let b = buffer([2]);

    let iface = setup_spi(&mut bus, &SpiStreamConfig::default(), &cb);

    iface.send(a, TransferTag(1)).unwrap();
    assert_eq!(iface.send(b, TransferTag(2)), Err(StreamError::InProgress));
    iface.on_event(SpiEvent::Done.into());

    iface.send(b, TransferTag(3)).unwrap();
    iface.on_event(SpiEvent::Done.into());

    assert_eq!(
        rec.calls(),
        vec![(TransferTag(1), Ok(())), (TransferTag(3), Ok(()))]
    );
    assert_eq!(trace.written(), vec![vec![1], vec![2]]);
}

#[test]
fn test_refill_between_sends() {
    let trace = Trace::default();
    let rec = Recorder::default();
    let cb = |tag: TransferTag, result: XferResult| rec.record(tag, result);
    let mut bus = MockSpi { trace: &trace };
    let frame = buffer([0u8; 2]);

    let iface = setup_spi(&mut bus, &SpiStreamConfig::default(), &cb);

    for n in 0..3u8 {
        frame.write(|data| data.copy_from_slice(&[n, n + 10])).unwrap();
        iface.send(frame, TransferTag(n as usize)).unwrap();

        // Not writable while the controller owns it
        assert_eq!(frame.write(|data| data[0] = 0xFF), Err(StreamError::InProgress));
        iface.on_event(SpiEvent::Done.into());
    }

    assert_eq!(trace.written(), vec![vec![0, 10], vec![1, 11], vec![2, 12]]);
    assert_eq!(rec.count(), 3);
    assert_eq!(contents(frame), [2, 12]);
}

use ember_viewer::{DirectorySink, Frame, FrameSink, NullSink};

#[test]
fn test_directory_sink_writes_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::create(dir.path().join("frames")).unwrap();

    sink.show(&Frame::new(7, vec![0xff, 0xd8, 0x01])).unwrap();
    sink.show(&Frame::new(8, vec![0xff, 0xd8, 0x02])).unwrap();

    let first = dir.path().join("frames").join("frame-000007.jpg");
    assert_eq!(std::fs::read(first).unwrap(), vec![0xff, 0xd8, 0x01]);
    assert_eq!(sink.written(), 2);
}

#[test]
fn test_boxed_sink_forwards() {
    let mut sink: Box<dyn FrameSink> = Box::new(NullSink::new());
    sink.show(&Frame::new(0, vec![1])).unwrap();
    sink.clear().unwrap();
}

use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, true, Rgba8::new(10, 20, 30, 255)).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_opaque_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, true, Rgba8::WHITE).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_straight_half_red_over_black() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, false, Rgba8::BLACK).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_over_bg_to_opaque_rgba8(&mut dst, &[0; 4], true, Rgba8::BLACK).is_err());
}

#[test]
fn command_pads_to_even_size_and_uses_rational_fps() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("out/ride.mp4"));
    let cmd = sink.command(&SinkConfig {
        width: 801,
        height: 600,
        fps: Fps::new(30000, 1001).unwrap(),
    });
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert!(args.iter().any(|a| a == "801x600"));
    assert!(args.iter().any(|a| a == "30000/1001"));
    assert!(args.iter().any(|a| a == "pad=ceil(iw/2)*2:ceil(ih/2)*2"));
    assert_eq!(args.last().map(String::as_str), Some("out/ride.mp4"));
}

#[test]
fn frames_before_begin_are_rejected() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("never.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.add_frame(&frame).is_err());
    sink.close().unwrap();
}

use softrender::{
    normalize, pack_rgb, transform, LedgerEvent, Matrix, RenderError, Renderer, RendererState,
    ResourceKind, ResourceLedger, TrackingPresenter, TrackingWindow, Vector4, CUBE_VERTICES,
};

#[test]
fn init_800_by_600_then_shutdown_releases_every_handle() {
    let ledger = ResourceLedger::new();
    let mut renderer = Renderer::new(TrackingPresenter::new(ledger.clone()));
    let window = TrackingWindow::new(42);

    renderer.init(800, 600, &window).expect("init");
    let buffer = renderer.frame_buffer();
    assert_eq!(buffer.pixels().map(<[u32]>::len), Some(800 * 600));
    assert_eq!(buffer.depth().map(<[f32]>::len), Some(800 * 600));

    renderer.shutdown();
    assert_eq!(renderer.state(), RendererState::ShutDown);
    assert!(ledger.outstanding().is_empty());
    assert_eq!(
        ledger.events()[3..],
        [
            LedgerEvent::Released(ResourceKind::Selection),
            LedgerEvent::Released(ResourceKind::Drawable),
            LedgerEvent::Released(ResourceKind::DeviceContext),
        ]
    );
}

#[test]
fn frames_present_background_until_shutdown() {
    let ledger = ResourceLedger::new();
    let mut renderer = Renderer::new(TrackingPresenter::new(ledger.clone()));
    let window = TrackingWindow::new(1);
    renderer.init(4, 3, &window).unwrap();

    for _ in 0..3 {
        renderer.update(&window).unwrap();
    }
    assert_eq!(ledger.frames_presented(), 3);
    assert_eq!(ledger.last_frame(), vec![pack_rgb(123, 195, 221); 12]);

    renderer.shutdown();
    let err = renderer.update(&window).unwrap_err();
    assert!(matches!(err, RenderError::InvalidState { .. }));
    assert_eq!(ledger.frames_presented(), 3);
}

#[test]
fn independent_renderers_do_not_share_state() {
    let first_ledger = ResourceLedger::new();
    let second_ledger = ResourceLedger::new();
    let mut first = Renderer::new(TrackingPresenter::new(first_ledger.clone()));
    let mut second = Renderer::new(TrackingPresenter::new(second_ledger.clone()));
    let (a, b) = (TrackingWindow::new(1), TrackingWindow::new(2));

    first.init(2, 2, &a).unwrap();
    second.init(3, 1, &b).unwrap();
    second.set_background(0x00FF_FFFF);
    second.update(&b).unwrap();
    first.update(&a).unwrap();

    assert_eq!(first_ledger.last_frame(), vec![pack_rgb(123, 195, 221); 4]);
    assert_eq!(second_ledger.last_frame(), vec![0x00FF_FFFF; 3]);

    first.shutdown();
    assert!(first_ledger.outstanding().is_empty());
    assert_eq!(second_ledger.outstanding().len(), 3);
}

#[test]
fn projected_cube_corner_lands_in_frame() {
    // A drawing stage would do this between clear and present.
    let ledger = ResourceLedger::new();
    let mut renderer = Renderer::new(TrackingPresenter::new(ledger.clone()));
    let window = TrackingWindow::new(1);
    renderer.init(4, 4, &window).unwrap();
    renderer.clear().unwrap();

    let to_screen = Matrix::from_rows([
        [2.0, 0.0, 0.0, 0.0],
        [0.0, -2.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [2.0, 2.0, 0.0, 1.0],
    ]);
    let corner = CUBE_VERTICES[2];
    let screen = transform(corner.point, &to_screen);
    assert_eq!(screen, Vector4::point(4.0, 4.0, -1.0));

    let (col, row) = (screen.x as usize - 1, screen.y as usize - 1);
    renderer.pixels_mut().unwrap()[row * 4 + col] = corner.packed_color();
    renderer.present(&window).unwrap();
    assert_eq!(ledger.last_frame()[15], 0x0000_00FF);

    let up = normalize(Vector4::direction(0.0, 3.0, 0.0));
    assert_eq!(up, Vector4::direction(0.0, 1.0, 0.0));
}

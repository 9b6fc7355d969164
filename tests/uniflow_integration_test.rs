#[cfg(feature = "integration-tests")]
use festive_ngin::flow::ImageTestResult;
#[cfg(feature = "integration-tests")]
use festive_ngin::{
    context::Context,
    flow::{FlowConsturctor, GraphicsFlow, Out},
    render::Render,
};
#[cfg(feature = "integration-tests")]
use wgpu::Color;

#[cfg(feature = "integration-tests")]
use crate::common::test_utils::State;

#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
enum Event {
    Test,
}

#[cfg(feature = "integration-tests")]
struct GraphicsElement;

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<State, Event> for GraphicsElement {
    fn on_init(&mut self, ctx: &mut Context, state: &mut State) -> Out<State, Event> {
        ctx.clear_colour = Color::TRANSPARENT;
        assert_eq!(state.frame_counter(), 0);
        assert_eq!(state.init_invocations(), 0);
        assert_eq!(state.update_invocations(), 0);

        state.init();
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut State,
        _: instant::Duration,
    ) -> Out<State, Event> {
        assert_eq!(state.frame_counter(), state.update_invocations());
        assert_eq!(state.init_invocations(), 1);
        state.frame();
        state.update();

        // test scenarios:
        let serve_sencha: Box<dyn FnOnce(&mut State)> = Box::new(|state: &mut State| {
            state.dummy_state.push('🍵');
        });
        let serve_mate: Box<dyn FnOnce(&mut State)> = Box::new(|state: &mut State| {
            state.dummy_state.push('🧉');
        });
        match state.frame_counter() {
            2 => Out::Configure(Box::new(|ctx: &mut Context| {
                ctx.clear_colour = Color::RED;
                ctx.tick_duration_millis = 10;
            })),
            3 => Out::FutEvent(vec![Box::new(async move { Event::Test })]),
            5 => Out::FutFn(vec![
                Box::new(async move { serve_sencha }),
                Box::new(async move { serve_mate }),
            ]),
            x if x > 5 => {
                assert_eq!(ctx.clear_colour, Color::RED);
                assert_eq!(ctx.tick_duration_millis, 10);
                assert_eq!(state.custom_invocations(), 1);
                assert!(state.dummy_state.contains('🧉'));
                assert!(state.dummy_state.contains('🍵'));
                // emojis are 4 bytes wide.
                assert_eq!(state.dummy_state.len(), 8, "{}", state.dummy_state);
                Out::Empty
            }
            _ => Out::Empty,
        }
    }

    fn on_tick(&mut self, _: &Context, _: &mut State) -> Out<State, Event> {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut State,
        _: &festive_ngin::DeviceEvent,
    ) -> Out<State, Event> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        _: &mut State,
        event: &festive_ngin::WindowEvent,
    ) -> Out<State, Event> {
        if let festive_ngin::WindowEvent::Resized(size) = event {
            if size.width > 0 && size.height > 0 {
                // The context follows the window before flows hear about it.
                assert_eq!(ctx.size(), [size.width, size.height]);
            }
        }
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, state: &mut State, _: Event) -> Option<Event> {
        // we send the event in frame 3
        assert!(state.frame_counter() >= 3);
        assert!(state.update_invocations() >= 3);
        state.custom();
        None
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        Render::None
    }

    fn render_to_texture(
        &self,
        _: &Context,
        state: &mut State,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        if state.frame_counter() > 7 {
            Ok(ImageTestResult::Passed)
        } else {
            Ok(ImageTestResult::Waiting)
        }
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_route_events_mutations_and_configuration() {
    let constructor: FlowConsturctor<State, Event> =
        Box::new(|_| Box::pin(async move { Box::new(GraphicsElement) as Box<dyn GraphicsFlow<_, _>> }));

    if let Err(e) = festive_ngin::flow::run(vec![constructor]) {
        panic!("{}", e);
    }
}

//! Wiegand Forwarder - ESP32 firmware relaying card reads to a serial device.
//!
//! Architecture:
//! - GPIO interrupt (`gpio_handler`): Wiegand D0/D1 edges into the shared capture state
//! - Main loop: frame completion, queueing, cadence-gated UART output, LED feedback
//!
//! All pipeline logic lives in the `wiegand_forwarder` library.

#![no_std]
#![no_main]

use esp_bootloader_esp_idf::esp_app_desc;
esp_app_desc!();

use core::cell::RefCell;
use critical_section::Mutex;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Event as GpioEvent, Input, InputConfig, Io, Level, Output, OutputConfig, Pull},
    handler,
    interrupt::Priority,
    main,
    time::Duration,
    timer::timg::{MwdtStage, TimerGroup},
    uart::{Config as UartConfig, Uart},
    Blocking,
};
use esp_println::logger::init_logger;

use wiegand_forwarder::{
    Config, Forwarder, Indicator, Line, OverflowPolicy, SinkError, Stats, TagQueue, TagSink,
    WiegandCapture, MAX_QUEUE_CAPACITY,
};

// Timing constants
const WATCHDOG_FEED_MS: u64 = 10_000;
const STATUS_LOG_MS: u64 = 60_000;

// Shared between the GPIO handler and the main loop
static CAPTURE: WiegandCapture = WiegandCapture::new();
static QUEUE: TagQueue<MAX_QUEUE_CAPACITY> = TagQueue::new(OverflowPolicy::DropOldest);
static STATS: Stats = Stats::new();

// Pin storage for interrupt handler access
type SharedPin = Mutex<RefCell<Option<Input<'static>>>>;

static D0_PIN: SharedPin = Mutex::new(RefCell::new(None));
static D1_PIN: SharedPin = Mutex::new(RefCell::new(None));

fn now_us() -> u64 {
    esp_hal::time::Instant::now().duration_since_epoch().as_micros()
}

/// Clear a pending edge on `pin`, reporting whether one was latched.
fn take_edge(pin: &SharedPin, cs: critical_section::CriticalSection<'_>) -> bool {
    match pin.borrow_ref_mut(cs).as_mut() {
        Some(input) if input.is_interrupt_set() => {
            input.clear_interrupt();
            true
        }
        _ => false,
    }
}

/// Falling edges on D0/D1. Priority3 keeps bit capture ahead of the main loop.
#[handler(priority = Priority::Priority3)]
fn gpio_handler() {
    let now = now_us();
    let (d0, d1) = critical_section::with(|cs| (take_edge(&D0_PIN, cs), take_edge(&D1_PIN, cs)));

    for (fired, line) in [(d0, Line::D0), (d1, Line::D1)] {
        if fired {
            CAPTURE.on_edge(line, now);
        }
    }
}

/// Blocking UART transmitter used as the tag sink.
struct UartSink {
    uart: Uart<'static, Blocking>,
}

impl TagSink for UartSink {
    fn write_line(&mut self, line: &[u8]) -> Result<(), SinkError> {
        let mut rest = line;
        while !rest.is_empty() {
            match self.uart.write(rest) {
                Ok(0) => return Err(SinkError::Busy),
                Ok(n) => rest = &rest[n..],
                Err(_) => return Err(SinkError::Io),
            }
        }
        Ok(())
    }
}

#[main]
fn main() -> ! {
    init_logger(log::LevelFilter::Info);
    log::info!("Wiegand forwarder starting...");

    let mut config = Config::get();
    if let Err(e) = config.validate() {
        log::error!("config: {}, falling back to defaults", e);
        config = Config::default();
    }
    log::info!(
        "config: filter={:?} gap={}ms partial={}ms send={}ms dup={}ms queue={} policy={:?}",
        config.edge_filter,
        config.complete_gap_ms,
        config.partial_timeout_ms,
        config.send_interval_ms,
        config.duplicate_window_ms,
        config.queue_capacity,
        config.overflow_policy
    );

    // Configure shared state before any edge can arrive
    let mut forwarder =
        Forwarder::new(&config, &CAPTURE, &QUEUE, &STATS).expect("config validated above");

    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    // Watchdog on TIMG1, fed from the main loop
    let timg1 = TimerGroup::new(peripherals.TIMG1);
    let mut wdt = timg1.wdt;
    wdt.enable();
    wdt.set_timeout(MwdtStage::Stage0, Duration::from_secs(30));

    // Serial link to the downstream device (UART2 TX on GPIO17)
    let uart = Uart::new(
        peripherals.UART2,
        UartConfig::default().with_baudrate(config.baud_rate),
    )
    .unwrap()
    .with_tx(peripherals.GPIO17);
    let mut sink = UartSink { uart };

    // Feedback LED (GPIO2)
    let led = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    let mut indicator = Indicator::new(led);

    // Wiegand reader pins (GPIO14=D0, GPIO27=D1) with pull-ups, falling edge
    let input_config = InputConfig::default().with_pull(Pull::Up);
    let mut d0_pin: Input<'static> = Input::new(peripherals.GPIO14, input_config);
    let mut d1_pin: Input<'static> = Input::new(peripherals.GPIO27, input_config);
    d0_pin.listen(GpioEvent::FallingEdge);
    d1_pin.listen(GpioEvent::FallingEdge);

    critical_section::with(|cs| {
        D0_PIN.borrow_ref_mut(cs).replace(d0_pin);
        D1_PIN.borrow_ref_mut(cs).replace(d1_pin);
    });

    let mut io = Io::new(peripherals.IO_MUX);
    io.set_interrupt_handler(gpio_handler);

    let delay = Delay::new();
    let poll_interval_ms = u32::try_from(config.poll_interval_ms).unwrap_or(u32::MAX);
    let mut last_watchdog_feed: u64 = 0;
    let mut last_status: u64 = 0;

    log::info!("wiegand: listening");

    loop {
        let now = now_us();
        let now_ms = now / 1000;

        forwarder.poll(now, &mut sink, &mut indicator);
        indicator.poll(now);

        // Feed watchdog to prove this loop isn't stuck
        if now_ms - last_watchdog_feed >= WATCHDOG_FEED_MS {
            last_watchdog_feed = now_ms;
            wdt.feed();
        }

        if now_ms - last_status >= STATUS_LOG_MS {
            last_status = now_ms;
            let s = STATS.snapshot();
            log::info!(
                "status: queued={} captured={} sent={} dup={} abandoned={} evicted={} rejected={} sink_err={}",
                QUEUE.len(),
                s.captured,
                s.transmitted,
                s.duplicates,
                s.abandoned,
                s.evicted,
                s.rejected,
                s.sink_errors
            );
        }

        delay.delay_millis(poll_interval_ms);
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    critical_section::with(|_| {
        log::error!("PANIC: {}", info);
    });

    // Spin without feeding watchdog. The 30s timeout will trigger a full system reset.
    loop {
        core::hint::spin_loop();
    }
}

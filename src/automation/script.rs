//! Login Macro 스크립트 생성 (VBScript / WScript.Shell)
//!
//! 구조:
//! 1. 창 제목으로 최대 40회(1초 간격) 포커스 시도
//! 2. 못 찾으면 종료 코드 10
//! 3. 안정화 대기 → 포커스 확인 → 중립 키 입력 → 포커스 재확인
//! 4. 두 확인 중 하나라도 실패하면 키 입력 없이 종료 코드 11
//! 5. 대기 후 아이디, TAB, 비밀번호 입력
//! 6. (옵션) 로그인 유지 체크박스: TAB x6, SPACE, TAB
//! 7. ENTER, 종료 코드 0

use std::fmt::Write as _;

use zeroize::Zeroizing;

use super::{EXIT_FOCUS_LOST, EXIT_OK, EXIT_WINDOW_NOT_FOUND, RIOT_WINDOW_TITLE};

/// SendKeys 문법에서 제어 문자로 쓰이는 문자들
const SEND_KEYS_SPECIAL: &[char] = &['{', '}', '[', ']', '(', ')', '+', '^', '%', '~', '"', '\''];

/// 포커스 재확인 전에 보내는 중립 키 (두 번 토글해서 상태 변화 없음)
const NEUTRAL_KEYS: &str = "{SCROLLLOCK}{SCROLLLOCK}";

/// 로그인 유지 체크박스까지의 TAB 횟수
const STAY_SIGNED_IN_TABS: usize = 6;

/// 특수 문자를 각각 `{c}`로 감쌉니다.
pub fn escape_send_keys(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for c in input.chars() {
        if SEND_KEYS_SPECIAL.contains(&c) {
            out.push('{');
            out.push(c);
            out.push('}');
        } else {
            out.push(c);
        }
    }
    out
}

/// VBScript 문자열 리터럴 안에서는 `"`를 `""`로 적어야 함.
/// 리터럴은 줄을 넘을 수 없으므로 CR/LF는 버림
fn vbs_literal(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect::<String>()
        .replace('"', "\"\"")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroTimings {
    pub poll_attempts: u32,
    pub poll_interval_ms: u64,
    pub settle_ms: u64,
    pub key_pause_ms: u64,
    pub toggle_pause_ms: u64,
}

impl Default for MacroTimings {
    fn default() -> Self {
        Self {
            poll_attempts: 40,
            poll_interval_ms: 1000,
            settle_ms: 1000,
            key_pause_ms: 100,
            toggle_pause_ms: 50,
        }
    }
}

/// 포커스 확인 후 주입되는 입력 단계
#[derive(Clone, PartialEq, Eq)]
pub enum KeyStep {
    /// 이미 escape된 SendKeys 문자열
    Keys(Zeroizing<String>),
    Sleep(u64),
}

impl KeyStep {
    fn keys(value: &str) -> Self {
        KeyStep::Keys(Zeroizing::new(value.to_string()))
    }
}

impl std::fmt::Debug for KeyStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyStep::Keys(keys) => match keys.as_str() {
                "{TAB}" | "{ENTER}" | " " => write!(f, "Keys({:?})", keys.as_str()),
                _ => f.write_str("Keys(<text>)"),
            },
            KeyStep::Sleep(ms) => write!(f, "Sleep({})", ms),
        }
    }
}

/// 로그인 매크로 1회분
pub struct LoginMacro {
    pub window_title: String,
    pub username: String,
    secret: Zeroizing<String>,
    pub stay_signed_in: bool,
    pub typing_delay_ms: u64,
    pub timings: MacroTimings,
}

impl std::fmt::Debug for LoginMacro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginMacro")
            .field("window_title", &self.window_title)
            .field("username", &self.username)
            .field("stay_signed_in", &self.stay_signed_in)
            .field("typing_delay_ms", &self.typing_delay_ms)
            .finish_non_exhaustive()
    }
}

impl LoginMacro {
    pub fn new(username: &str, secret: &str, stay_signed_in: bool, typing_delay_ms: u64) -> Self {
        Self {
            window_title: RIOT_WINDOW_TITLE.to_string(),
            username: username.to_string(),
            secret: Zeroizing::new(secret.to_string()),
            stay_signed_in,
            typing_delay_ms,
            timings: MacroTimings::default(),
        }
    }

    pub fn with_timings(mut self, timings: MacroTimings) -> Self {
        self.timings = timings;
        self
    }

    /// 포커스 재확인을 통과한 뒤 보낼 입력 순서
    pub fn injection_steps(&self) -> Vec<KeyStep> {
        let pause = self.timings.key_pause_ms;
        let mut steps = vec![
            KeyStep::Sleep(self.typing_delay_ms),
            KeyStep::Keys(Zeroizing::new(escape_send_keys(&self.username))),
            KeyStep::Sleep(pause),
            KeyStep::keys("{TAB}"),
            KeyStep::Sleep(pause),
            KeyStep::Keys(Zeroizing::new(escape_send_keys(&self.secret))),
            KeyStep::Sleep(pause),
        ];

        // 탭 순서에 의존하는 best-effort 동작. 체크 상태는 확인할 수 없음
        if self.stay_signed_in {
            for _ in 0..STAY_SIGNED_IN_TABS {
                steps.push(KeyStep::keys("{TAB}"));
                steps.push(KeyStep::Sleep(self.timings.toggle_pause_ms));
            }
            steps.push(KeyStep::keys(" "));
            steps.push(KeyStep::Sleep(self.timings.toggle_pause_ms));
            steps.push(KeyStep::keys("{TAB}"));
            steps.push(KeyStep::Sleep(pause));
        }

        steps.push(KeyStep::keys("{ENTER}"));
        steps
    }

    /// 실행 가능한 VBScript 본문 (비밀번호 포함)
    pub fn render(&self) -> Zeroizing<String> {
        let t = &self.timings;
        let title = vbs_literal(&self.window_title);
        let mut script = Zeroizing::new(String::with_capacity(2048));

        // String에 대한 write!는 실패하지 않음
        let _ = write!(
            script,
            r#"Option Explicit
Dim WshShell, i, found
Set WshShell = WScript.CreateObject("WScript.Shell")
found = False
For i = 1 To {attempts}
  If WshShell.AppActivate("{title}") Then
    found = True
    Exit For
  End If
  WScript.Sleep {interval}
Next
If Not found Then
  WScript.Quit {not_found}
End If
WScript.Sleep {settle}
If Not WshShell.AppActivate("{title}") Then
  WScript.Quit {focus_lost}
End If
WshShell.SendKeys "{neutral}"
If Not WshShell.AppActivate("{title}") Then
  WScript.Quit {focus_lost}
End If
"#,
            attempts = t.poll_attempts,
            title = title,
            interval = t.poll_interval_ms,
            not_found = EXIT_WINDOW_NOT_FOUND,
            settle = t.settle_ms,
            neutral = NEUTRAL_KEYS,
            focus_lost = EXIT_FOCUS_LOST,
        );

        for step in self.injection_steps() {
            match step {
                KeyStep::Keys(keys) => {
                    let _ = writeln!(script, "WshShell.SendKeys \"{}\"", vbs_literal(&keys));
                }
                KeyStep::Sleep(ms) => {
                    let _ = writeln!(script, "WScript.Sleep {}", ms);
                }
            }
        }

        let _ = writeln!(script, "WScript.Quit {}", EXIT_OK);
        script
    }
}

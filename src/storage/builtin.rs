//! 内置知识库
//!
//! 新数据库首次打开时写入，覆盖初学者最常见的 Python 错误。

use crate::core::models::{ErrorType, KbSnapshot, RuleDefinition, RuleKind};

fn error_type(
    id: i64,
    name: &str,
    category: &str,
    severity: i32,
    explanation: &str,
    suggestion: &str,
) -> ErrorType {
    ErrorType {
        id,
        name: name.to_string(),
        category: category.to_string(),
        severity,
        explanation: explanation.to_string(),
        suggestion: suggestion.to_string(),
    }
}

fn rule(
    id: i64,
    name: &str,
    kind: RuleKind,
    pattern: &str,
    conclusion: i64,
    diag_text: &str,
    priority: i32,
) -> RuleDefinition {
    RuleDefinition {
        id,
        name: name.to_string(),
        kind,
        pattern_regex: pattern.to_string(),
        conclusion_error_type_id: conclusion,
        diag_text: diag_text.to_string(),
        priority,
    }
}

/// 块头正文：不含 ':'，括号须在本行闭合（只认一层）
///
/// 未闭合的括号或行尾 `\` 说明语句头续到下一行，不算缺少 ':'。
const HEADER_BODY: &str = r"(?:[^:\n(\[{\\]|\([^()\n]*\)|\[[^\[\]\n]*\]|\{[^{}\n]*\})*";

fn missing_colon(keywords: &str) -> String {
    format!(r"^\s*({})\b{}$", keywords, HEADER_BODY)
}

/// 内置知识库快照
pub fn knowledge_base() -> KbSnapshot {
    use RuleKind::{Code, Message};

    let error_types = vec![
        error_type(
            1,
            "MissingColon",
            "SYNTACTIC",
            3,
            "if/for/while/def/class 等块语句的头部必须以 ':' 结尾。",
            "在该行末尾加上 ':'，并确认下一行已缩进。",
        ),
        error_type(
            2,
            "InvalidSyntax",
            "SYNTACTIC",
            3,
            "解析器无法理解这段代码的结构。",
            "检查报错行及其上一行的括号、引号和运算符。",
        ),
        error_type(
            3,
            "IndentationProblem",
            "SYNTACTIC",
            3,
            "Python 用缩进表示代码块，缩进不一致会导致解析失败。",
            "统一使用4个空格缩进，不要混用 Tab 和空格。",
        ),
        error_type(
            4,
            "UnclosedBracket",
            "SYNTACTIC",
            3,
            "括号或引号没有成对出现。",
            "从报错位置向前查找未闭合的 (、[、{ 或引号。",
        ),
        error_type(
            5,
            "AssignmentInCondition",
            "SYNTACTIC",
            2,
            "条件中使用了赋值运算符 '='，比较应使用 '=='。",
            "把条件里的 '=' 改为 '=='。",
        ),
        error_type(
            6,
            "LegacyPrint",
            "SYNTACTIC",
            2,
            "Python 3 中 print 是函数，不再是语句。",
            "改写为 print(...)。",
        ),
        error_type(
            7,
            "NameNotDefined",
            "SEMANTIC",
            2,
            "使用了尚未定义的变量或函数名。",
            "确认名字拼写正确，并在使用前先赋值或导入。",
        ),
        error_type(
            8,
            "TypeMismatch",
            "SEMANTIC",
            2,
            "运算的两侧类型不兼容，例如字符串与整数相加。",
            "用 str()、int() 等显式转换类型，或使用 f-string。",
        ),
        error_type(
            9,
            "NotCallable",
            "SEMANTIC",
            2,
            "尝试调用一个不是函数的对象。",
            "检查是否用变量覆盖了同名函数，或多写了一对括号。",
        ),
        error_type(
            10,
            "AttributeMissing",
            "SEMANTIC",
            2,
            "对象没有所访问的属性或方法。",
            "用 dir(obj) 查看可用属性，确认对象类型和拼写。",
        ),
        error_type(
            11,
            "ModuleMissing",
            "SEMANTIC",
            2,
            "导入的模块不存在或没有安装。",
            "检查模块名拼写，必要时用 pip install 安装。",
        ),
        error_type(
            12,
            "UnboundLocal",
            "SEMANTIC",
            2,
            "函数内对变量赋值使其成为局部变量，但在赋值前就读取了它。",
            "在读取前先赋值，或用 global/nonlocal 声明。",
        ),
        error_type(
            13,
            "DivisionByZero",
            "RUNTIME",
            1,
            "除数为零。",
            "在除法前检查除数是否为零。",
        ),
        error_type(
            14,
            "IndexOutOfRange",
            "RUNTIME",
            1,
            "下标超出了序列的长度。",
            "下标范围是 0 到 len(seq) - 1，访问前先检查长度。",
        ),
        error_type(
            15,
            "KeyNotFound",
            "RUNTIME",
            1,
            "字典中不存在该键。",
            "使用 dict.get(key, 默认值) 或先用 in 判断。",
        ),
        error_type(
            16,
            "InvalidConversion",
            "RUNTIME",
            1,
            "字符串内容无法转换为目标数值类型。",
            "转换前校验输入，或用 try/except ValueError 处理。",
        ),
    ];

    let rules = vec![
        // 静态代码模式
        rule(1, "IfMissingColon", Code, &missing_colon("if|elif"), 1, "'if' 语句头缺少 ':'", 10),
        rule(2, "ForMissingColon", Code, &missing_colon("for"), 1, "'for' 语句头缺少 ':'", 10),
        rule(3, "WhileMissingColon", Code, &missing_colon("while"), 1, "'while' 语句头缺少 ':'", 10),
        rule(4, "DefMissingColon", Code, &missing_colon("def"), 1, "函数定义缺少 ':'", 10),
        rule(5, "ClassMissingColon", Code, &missing_colon("class"), 1, "类定义缺少 ':'", 10),
        rule(
            6,
            "AssignInCondition",
            Code,
            r"^\s*(if|elif|while)\s+[A-Za-z_][\w.\[\]]*\s*=[^=]",
            5,
            "条件中使用了 '=' 而不是 '=='",
            20,
        ),
        rule(7, "PrintStatement", Code, r#"^\s*print\s+["'\w]"#, 6, "使用了 Python 2 的 print 语句", 20),
        // 错误消息模式
        rule(20, "MissingColonMessage", Message, r"expected ':'", 1, "解析器提示缺少 ':'", 30),
        rule(21, "InvalidSyntaxMessage", Message, r"invalid syntax", 2, "解析器报告语法无效", 40),
        rule(22, "UnexpectedIndent", Message, r"unexpected indent", 3, "出现了多余的缩进", 30),
        rule(
            23,
            "ExpectedIndentedBlock",
            Message,
            r"expected an indented block",
            3,
            "块语句后缺少缩进的代码",
            30,
        ),
        rule(
            24,
            "UnindentMismatch",
            Message,
            r"unindent does not match|inconsistent use of tabs and spaces",
            3,
            "缩进层级不一致",
            30,
        ),
        rule(
            25,
            "UnclosedBracket",
            Message,
            r"was never closed|unexpected EOF while parsing|unmatched '[)\]}]'",
            4,
            "括号未闭合或不匹配",
            30,
        ),
        rule(
            26,
            "NameNotDefined",
            Message,
            r"NameError: name '[^']+' is not defined",
            7,
            "使用了未定义的名字",
            50,
        ),
        rule(
            27,
            "StrIntConcat",
            Message,
            r"TypeError: (can't concat|can only concatenate|must be str, not)",
            8,
            "字符串与其他类型直接拼接",
            50,
        ),
        rule(
            28,
            "UnsupportedOperand",
            Message,
            r"TypeError: unsupported operand type",
            8,
            "运算符不支持这两种类型",
            50,
        ),
        rule(
            29,
            "NotCallable",
            Message,
            r"TypeError: '[^']+' object is not callable",
            9,
            "调用了不可调用的对象",
            50,
        ),
        rule(
            30,
            "AttributeMissing",
            Message,
            r"AttributeError: .+ has no attribute",
            10,
            "访问了不存在的属性",
            50,
        ),
        rule(
            31,
            "ModuleMissing",
            Message,
            r"(ModuleNotFoundError|ImportError): No module named",
            11,
            "找不到要导入的模块",
            50,
        ),
        rule(32, "UnboundLocal", Message, r"UnboundLocalError", 12, "局部变量在赋值前被读取", 50),
        rule(33, "DivisionByZero", Message, r"ZeroDivisionError", 13, "除以零", 60),
        rule(
            34,
            "IndexOutOfRange",
            Message,
            r"IndexError: .*out of range",
            14,
            "下标越界",
            60,
        ),
        rule(35, "KeyNotFound", Message, r"^KeyError:", 15, "字典键不存在", 60),
        rule(
            36,
            "InvalidConversion",
            Message,
            r"ValueError: (invalid literal for int\(\)|could not convert string to float)",
            16,
            "字符串无法转换为数字",
            60,
        ),
    ];

    KbSnapshot { error_types, rules }
}
